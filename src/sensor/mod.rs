//! Device attitude input.
//!
//! A [`DeviceOrientationProvider`] hands the render thread the latest
//! absolute attitude of the device. A missing provider is a supported
//! configuration: the view then runs pan-only.

/// Thread-safe sample feed with bounded waiting.
pub mod feed;

use std::time::Duration;

use glam::Quat;

pub use feed::{FeedProvider, SensorFeed};

use crate::util::FrameTime;

/// Absolute device attitude sampled at a point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    /// World-relative attitude as a unit quaternion.
    pub rotation: Quat,
    /// When the sample was taken.
    pub timestamp: FrameTime,
}

impl Orientation {
    /// Sample at `timestamp`. The rotation is normalized.
    pub fn new(rotation: Quat, timestamp: FrameTime) -> Self {
        Self {
            rotation: rotation.normalize(),
            timestamp,
        }
    }

    /// Whether the rotation is finite and close to unit length.
    pub fn is_valid(&self) -> bool {
        self.rotation.is_finite() && self.rotation.is_normalized()
    }
}

/// Source of device attitude samples.
///
/// Called from the render thread once per frame, in this order:
/// [`should_wait`](Self::should_wait), optionally [`wait`](Self::wait), then
/// [`current_orientation`](Self::current_orientation).
pub trait DeviceOrientationProvider: Send {
    /// True when no usable sample exists yet for `time` (sensor warm-up or
    /// lag).
    fn should_wait(&self, time: FrameTime) -> bool;

    /// Block until a sample for `time` is available, for at most `timeout`.
    ///
    /// Returns `true` when a sample became available. Implementations must
    /// honor the bound.
    fn wait(&self, time: FrameTime, timeout: Duration) -> bool;

    /// Best estimate at or before `time`, or `None` before the first sample.
    fn current_orientation(&self, time: FrameTime) -> Option<Orientation>;
}
