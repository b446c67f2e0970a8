//! User-driven rotation from pan gestures.
//!
//! Pan deltas accumulate into a clamped yaw/pitch offset; releasing with
//! velocity starts a decelerating fling, and a reset eases back to centre.
//! Both animations are cancellable through tokens.

/// Fling and reset animation values.
pub mod animation;
/// Clamped yaw/pitch state machine and its shared handle.
pub mod controller;
/// Point-space gesture events and their angular adapter.
pub mod event;

pub use animation::{AnimationKind, AnimationToken, PanAnimation};
pub use controller::{PanHandle, PanRotationController, PanSettings, PanState};
pub use event::{PanEvent, PanGestureAdapter};
