//! Angular bounds for the user-driven rotation.

/// Per-axis rotation ranges and the two-axis clamp.
pub mod range;

pub use range::{RotationClamp, RotationRange};
