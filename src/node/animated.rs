use glam::Quat;

use crate::util::easing::progress;
use crate::util::{EasingFunction, FrameTime};

/// A rotation that can glide to a new value over time.
///
/// Evaluated with spherical interpolation between the value at the moment
/// of retargeting and the new target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimatedRotation {
    from: Quat,
    to: Quat,
    start: FrameTime,
    duration: f64,
    easing: EasingFunction,
}

impl AnimatedRotation {
    /// Constant rotation.
    pub fn fixed(rotation: Quat) -> Self {
        Self {
            from: rotation,
            to: rotation,
            start: FrameTime::ZERO,
            duration: 0.0,
            easing: EasingFunction::Linear,
        }
    }

    /// Rotation at `time`.
    pub fn value_at(&self, time: FrameTime) -> Quat {
        if self.duration <= 0.0 || self.from == self.to {
            return self.to;
        }
        let p = progress(time.elapsed_since(self.start), self.duration);
        if p >= 1.0 {
            return self.to;
        }
        self.from.slerp(self.to, self.easing.evaluate(p)).normalize()
    }

    /// Final rotation once any animation settles.
    pub fn target(&self) -> Quat {
        self.to
    }

    /// Whether the rotation is still moving at `time`.
    pub fn is_animating(&self, time: FrameTime) -> bool {
        self.duration > 0.0
            && self.from != self.to
            && progress(time.elapsed_since(self.start), self.duration) < 1.0
    }

    /// Jump to `rotation` with no animation.
    pub fn snap(&mut self, rotation: Quat) {
        *self = Self::fixed(rotation);
    }

    /// Glide from the value at `now` to `rotation`, starting at `start`.
    ///
    /// `start` may precede `now` when following an animation driven by
    /// someone else's clock.
    pub fn animate_to(
        &mut self,
        rotation: Quat,
        now: FrameTime,
        start: FrameTime,
        duration: f64,
        easing: EasingFunction,
    ) {
        if duration <= 0.0 {
            self.snap(rotation);
            return;
        }
        let from = self.value_at(now);
        *self = Self {
            from,
            to: rotation,
            start,
            duration,
            easing,
        };
    }
}

impl Default for AnimatedRotation {
    fn default() -> Self {
        Self::fixed(Quat::IDENTITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: f64) -> FrameTime {
        FrameTime::from_secs(s)
    }

    #[test]
    fn snap_is_immediate() {
        let mut r = AnimatedRotation::default();
        let q = Quat::from_rotation_y(1.0);
        r.snap(q);
        assert_eq!(r.value_at(t(0.0)), q);
        assert!(!r.is_animating(t(0.0)));
    }

    #[test]
    fn glide_reaches_target_after_duration() {
        let mut r = AnimatedRotation::default();
        let q = Quat::from_rotation_y(1.0);
        r.animate_to(q, t(1.0), t(1.0), 0.5, EasingFunction::Linear);
        let mid = r.value_at(t(1.25));
        assert!(mid.angle_between(Quat::from_rotation_y(0.5)) < 1e-4);
        assert_eq!(r.value_at(t(1.5)), q);
        assert!(r.is_animating(t(1.25)));
        assert!(!r.is_animating(t(1.5)));
    }

    #[test]
    fn retarget_starts_from_current_value() {
        let mut r = AnimatedRotation::default();
        r.animate_to(Quat::from_rotation_y(1.0), t(0.0), t(0.0), 1.0, EasingFunction::Linear);
        r.animate_to(Quat::from_rotation_y(2.0), t(0.5), t(0.5), 1.0, EasingFunction::Linear);
        assert!(r.value_at(t(0.5)).angle_between(Quat::from_rotation_y(0.5)) < 1e-4);
    }

    #[test]
    fn glide_ends_when_float_elapsed_rounds_short() {
        let mut r = AnimatedRotation::default();
        let q = Quat::from_rotation_y(1.0);
        r.animate_to(q, t(2.0), t(2.0), 0.3, EasingFunction::DEFAULT);
        // 2.3 - 2.0 is slightly below 0.3 in f64.
        assert_eq!(r.value_at(t(2.3)), q);
        assert!(!r.is_animating(t(2.3)));
    }

    #[test]
    fn zero_duration_snaps() {
        let mut r = AnimatedRotation::default();
        let q = Quat::from_rotation_x(0.3);
        r.animate_to(q, t(0.0), t(0.0), 0.0, EasingFunction::Linear);
        assert_eq!(r.value_at(t(0.0)), q);
    }
}
