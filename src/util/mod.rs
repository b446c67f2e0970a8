//! Shared utilities: easing curves and the monotonic frame clock.

pub mod easing;
/// Monotonic frame timestamps and FPS smoothing.
pub mod frame_clock;

pub use easing::EasingFunction;
pub use frame_clock::{FrameClock, FrameTime};
