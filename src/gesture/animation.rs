//! Time-driven pan animations (fling and reset).
//!
//! An animation is a plain value: start offset, target offset, start time,
//! duration and curve. Its value at any frame time is a pure function of
//! those fields, so it can be evaluated from any thread and tested without
//! a render loop.

use crate::util::easing::progress;
use crate::util::{EasingFunction, FrameTime};

/// Identifies one started animation.
///
/// The controller bumps its generation on every start and cancel; an
/// animation whose token no longer matches is dead and is never evaluated
/// or reported again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationToken(pub(crate) u64);

/// What started an animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationKind {
    /// Decelerating continuation after gesture release.
    Inertia,
    /// Return to the centered (zero) offset.
    Reset,
}

/// An in-flight yaw/pitch animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanAnimation {
    /// Why the animation runs.
    pub kind: AnimationKind,
    /// Cancellation token.
    pub token: AnimationToken,
    /// Offset `(yaw, pitch)` at `start_time`.
    pub from: (f32, f32),
    /// Offset `(yaw, pitch)` reached after `duration`.
    pub to: (f32, f32),
    /// Frame time the animation started.
    pub start_time: FrameTime,
    /// Length in seconds.
    pub duration: f64,
    /// Curve applied to normalized progress.
    pub easing: EasingFunction,
}

impl PanAnimation {
    /// Offset at `time`. Before `start_time` this is `from`; after the end it
    /// is exactly `to`.
    #[inline]
    pub fn value_at(&self, time: FrameTime) -> (f32, f32) {
        let elapsed = time.elapsed_since(self.start_time);
        (
            self.easing
                .interpolate(elapsed, self.duration, self.from.0, self.to.0),
            self.easing
                .interpolate(elapsed, self.duration, self.from.1, self.to.1),
        )
    }

    /// Whether the animation has reached its target at `time`.
    ///
    /// Uses the same normalized progress as [`value_at`](Self::value_at),
    /// so an animation is finished exactly when its value is the target.
    pub fn is_finished(&self, time: FrameTime) -> bool {
        progress(time.elapsed_since(self.start_time), self.duration) >= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reset(duration: f64) -> PanAnimation {
        PanAnimation {
            kind: AnimationKind::Reset,
            token: AnimationToken(1),
            from: (1.0, -0.5),
            to: (0.0, 0.0),
            start_time: FrameTime::from_secs(10.0),
            duration,
            easing: EasingFunction::DEFAULT,
        }
    }

    #[test]
    fn value_before_start_is_origin() {
        let anim = reset(0.3);
        assert_eq!(anim.value_at(FrameTime::from_secs(9.0)), (1.0, -0.5));
    }

    #[test]
    fn value_after_end_is_exact_target() {
        let anim = reset(0.3);
        assert_eq!(anim.value_at(FrameTime::from_secs(10.3)), (0.0, 0.0));
        assert!(anim.is_finished(FrameTime::from_secs(10.3)));
        assert!(!anim.is_finished(FrameTime::from_secs(10.1)));
    }

    #[test]
    fn finishes_when_float_elapsed_rounds_short() {
        let anim = PanAnimation {
            start_time: FrameTime::from_secs(2.0),
            ..reset(0.3)
        };
        // 2.3 - 2.0 is slightly below 0.3 in f64.
        let end = FrameTime::from_secs(2.3);
        assert_eq!(anim.value_at(end), (0.0, 0.0));
        assert!(anim.is_finished(end));
    }

    #[test]
    fn midpoint_is_eased_not_linear() {
        let anim = reset(1.0);
        let (yaw, _) = anim.value_at(FrameTime::from_secs(10.25));
        // Ease-out covers more than a quarter of the way after a quarter of
        // the time.
        assert!(yaw < 0.75, "expected eased progress, got {yaw}");
        assert!(yaw > 0.0);
    }
}
