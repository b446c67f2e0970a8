//! Easing curves for rotation animations.
//!
//! Every curve maps normalized progress in `[0, 1]` to eased progress in
//! `[0, 1]`, so an eased value never leaves the segment between its start
//! and target.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Easing function variants for animation curves.
#[derive(
    Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum EasingFunction {
    /// Linear interpolation (no easing).
    Linear,
    /// Quadratic ease-in (slow start, fast end).
    QuadraticIn,
    /// Quadratic ease-out (fast start, slow end). Matches a constant
    /// deceleration, so a fling released at velocity `v` starts at `v` and
    /// stops exactly at the end of its duration.
    QuadraticOut,
    /// Cubic Hermite interpolation with configurable control points.
    /// Formula: c1·3t(1-t)² + c2·3(1-t)t² + t³
    CubicHermite {
        /// First inner control point.
        c1: f32,
        /// Second inner control point.
        c2: f32,
    },
}

impl EasingFunction {
    /// Default easing function: CubicHermite with c1=0.33, c2=1.0 for natural
    /// ease-out feel.
    pub const DEFAULT: EasingFunction =
        EasingFunction::CubicHermite { c1: 0.33, c2: 1.0 };

    /// Evaluate the easing function at normalized progress `t`.
    ///
    /// Input is clamped to [0.0, 1.0].
    #[inline]
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            EasingFunction::Linear => t,
            EasingFunction::QuadraticIn => t * t,
            EasingFunction::QuadraticOut => {
                let omt = 1.0 - t;
                1.0 - omt * omt
            }
            EasingFunction::CubicHermite { c1, c2 } => {
                let omt = 1.0 - t;
                c1 * 3.0 * t * omt * omt + c2 * 3.0 * omt * t * t + t * t * t
            }
        }
    }

    /// Eased value between `start` and `target` after `elapsed` seconds of a
    /// `duration`-second animation.
    ///
    /// A zero or negative duration lands on `target` immediately.
    #[inline]
    pub fn interpolate(
        &self,
        elapsed: f64,
        duration: f64,
        start: f32,
        target: f32,
    ) -> f32 {
        let eased = self.evaluate(progress(elapsed, duration));
        if eased >= 1.0 {
            return target;
        }
        start + (target - start) * eased
    }
}

impl Default for EasingFunction {
    #[inline]
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Normalized progress of an animation, clamped to `[0, 1]`.
#[inline]
pub fn progress(elapsed: f64, duration: f64) -> f32 {
    if duration <= 0.0 {
        return 1.0;
    }
    (elapsed / duration).clamp(0.0, 1.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_endpoints() {
        let linear = EasingFunction::Linear;
        assert_eq!(linear.evaluate(0.0), 0.0);
        assert_eq!(linear.evaluate(0.5), 0.5);
        assert_eq!(linear.evaluate(1.0), 1.0);
    }

    #[test]
    fn test_cubic_hermite_endpoints() {
        let hermite = EasingFunction::DEFAULT;
        assert_eq!(hermite.evaluate(0.0), 0.0);
        assert!((hermite.evaluate(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_quadratic_out_is_ease_out() {
        let quad_out = EasingFunction::QuadraticOut;
        assert_eq!(quad_out.evaluate(0.5), 0.75);
        assert!(quad_out.evaluate(0.25) > 0.25);
    }

    #[test]
    fn test_input_clamping() {
        let hermite = EasingFunction::DEFAULT;
        assert_eq!(hermite.evaluate(-0.5), 0.0);
        assert!((hermite.evaluate(1.5) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn interpolate_hits_target_exactly_at_end() {
        let f = EasingFunction::DEFAULT;
        assert_eq!(f.interpolate(0.3, 0.3, 0.7, -0.2), -0.2);
        assert_eq!(f.interpolate(5.0, 0.3, 0.7, -0.2), -0.2);
        assert_eq!(f.interpolate(0.0, 0.3, 0.7, -0.2), 0.7);
    }

    #[test]
    fn interpolate_zero_duration_snaps() {
        let f = EasingFunction::Linear;
        assert_eq!(f.interpolate(0.0, 0.0, 1.0, 2.0), 2.0);
    }

    #[test]
    fn interpolated_values_stay_between_endpoints() {
        for f in [
            EasingFunction::Linear,
            EasingFunction::QuadraticIn,
            EasingFunction::QuadraticOut,
            EasingFunction::DEFAULT,
        ] {
            for step in 0..=20 {
                let v = f.interpolate(f64::from(step) * 0.05, 1.0, 1.0, 3.0);
                assert!((1.0..=3.0).contains(&v), "{f:?} left range: {v}");
            }
        }
    }

    #[test]
    fn easing_round_trips_through_toml_tagging() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            easing: EasingFunction,
        }
        let s = toml::to_string(&Wrapper {
            easing: EasingFunction::QuadraticOut,
        })
        .unwrap();
        let back: Wrapper = toml::from_str(&s).unwrap();
        assert_eq!(back.easing, EasingFunction::QuadraticOut);
    }
}
