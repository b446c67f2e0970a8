use crate::util::EasingFunction;

/// Default implicit animation length for sensor updates: one fifteenth of a
/// second smooths sensor jitter without visible lag.
pub const DEFAULT_ANIMATION_DURATION: f64 = 1.0 / 15.0;

/// Animation rules for every transform mutation made in one frame.
///
/// The coordinator opens exactly one transaction per frame and passes it to
/// each mutation, so the renderer never sees two sub-rotations animate as
/// separate steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transaction {
    /// Implicit animation length in seconds.
    pub animation_duration: f64,
    /// When set, mutations take effect immediately (hard cut).
    pub disable_actions: bool,
    /// Curve used for implicit animations.
    pub easing: EasingFunction,
}

impl Transaction {
    /// Transaction animating over `animation_duration` seconds.
    pub fn new(animation_duration: f64) -> Self {
        Self {
            animation_duration,
            disable_actions: false,
            easing: EasingFunction::Linear,
        }
    }

    /// Transaction that applies every mutation immediately.
    pub fn immediate() -> Self {
        Self {
            disable_actions: true,
            ..Self::new(0.0)
        }
    }

    /// Duration mutations should actually animate over.
    pub fn effective_duration(&self) -> f64 {
        if self.disable_actions || !self.animation_duration.is_finite() {
            0.0
        } else {
            self.animation_duration.max(0.0)
        }
    }
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new(DEFAULT_ANIMATION_DURATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_actions_zero_the_duration() {
        let mut txn = Transaction::default();
        assert_eq!(txn.effective_duration(), DEFAULT_ANIMATION_DURATION);
        txn.disable_actions = true;
        assert_eq!(txn.effective_duration(), 0.0);
        assert_eq!(Transaction::immediate().effective_duration(), 0.0);
    }

    #[test]
    fn nonsense_durations_collapse_to_zero() {
        assert_eq!(Transaction::new(-1.0).effective_duration(), 0.0);
        assert_eq!(Transaction::new(f64::NAN).effective_duration(), 0.0);
    }
}
