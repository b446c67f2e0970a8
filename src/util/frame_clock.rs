use std::ops::Add;

use web_time::{Duration, Instant};

/// Monotonic frame timestamp in seconds.
///
/// Every time-dependent operation takes a `FrameTime` instead of reading a
/// wall clock, so interpolation is a pure function of the value passed in.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct FrameTime(f64);

impl FrameTime {
    /// Timestamp zero.
    pub const ZERO: FrameTime = FrameTime(0.0);

    /// Timestamp from seconds.
    #[must_use]
    pub const fn from_secs(secs: f64) -> Self {
        Self(secs)
    }

    /// Seconds since the clock origin.
    #[must_use]
    pub const fn as_secs(self) -> f64 {
        self.0
    }

    /// Seconds elapsed since `earlier`, never negative.
    #[must_use]
    pub fn elapsed_since(self, earlier: FrameTime) -> f64 {
        (self.0 - earlier.0).max(0.0)
    }

    /// The later of two timestamps.
    #[must_use]
    pub fn max(self, other: FrameTime) -> FrameTime {
        if other.0 > self.0 {
            other
        } else {
            self
        }
    }
}

impl Add<Duration> for FrameTime {
    type Output = FrameTime;

    fn add(self, rhs: Duration) -> FrameTime {
        FrameTime(self.0 + rhs.as_secs_f64())
    }
}

/// Frame clock producing monotonic [`FrameTime`]s with a smoothed FPS
/// readout.
///
/// Clones share the origin, so a sensor thread holding a clone stamps its
/// samples on the same timeline as the render loop.
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// Clock origin.
    origin: Instant,
    /// Last frame timestamp.
    last_frame: FrameTime,
    /// Smoothed FPS using exponential moving average
    smoothed_fps: f32,
    /// Smoothing factor (lower = smoother, 0.0-1.0)
    smoothing: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// Start a clock whose origin is now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            last_frame: FrameTime::ZERO,
            smoothed_fps: 60.0,
            smoothing: 0.05,
        }
    }

    /// Current time on this clock, without advancing the frame.
    pub fn now(&self) -> FrameTime {
        FrameTime(self.origin.elapsed().as_secs_f64())
    }

    /// Timestamp for the frame about to be rendered.
    ///
    /// Never goes backwards, even if the platform clock does.
    pub fn tick(&mut self) -> FrameTime {
        let now = self.now().max(self.last_frame);

        let frame_time = now.elapsed_since(self.last_frame) as f32;
        if frame_time > 0.0 {
            let instant_fps = 1.0 / frame_time;
            self.smoothed_fps = self.smoothed_fps * (1.0 - self.smoothing)
                + instant_fps * self.smoothing;
        }
        self.last_frame = now;
        now
    }

    /// Timestamp of the most recent [`tick`](Self::tick).
    pub fn last_frame(&self) -> FrameTime {
        self.last_frame
    }

    /// Get the current FPS (smoothed)
    pub fn fps(&self) -> f32 {
        self.smoothed_fps
    }
}
