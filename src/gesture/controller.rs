//! Clamped yaw/pitch accumulation driven by pan gestures.
//!
//! [`PanRotationController`] is the single-threaded state machine;
//! [`PanHandle`] wraps it in a lock so the input thread can write while the
//! render thread reads. Every read and write of the offset happens under
//! that one lock, so yaw and pitch are never observed half-updated.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use glam::{Quat, Vec2};

use super::animation::{AnimationKind, AnimationToken, PanAnimation};
use crate::error::PanoError;
use crate::rotation::RotationClamp;
use crate::util::{EasingFunction, FrameTime};

/// Tunables for the pan controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanSettings {
    /// Per-axis bounds.
    pub clamp: RotationClamp,
    /// Whether vertical drags change pitch.
    pub vertical_enabled: bool,
    /// Fling length in seconds.
    pub inertia_duration: f64,
    /// Reset animation length in seconds.
    pub reset_duration: f64,
    /// Reset animation curve.
    pub reset_easing: EasingFunction,
}

impl Default for PanSettings {
    fn default() -> Self {
        Self {
            clamp: RotationClamp::default(),
            vertical_enabled: true,
            inertia_duration: 0.8,
            reset_duration: 0.3,
            reset_easing: EasingFunction::DEFAULT,
        }
    }
}

impl PanSettings {
    /// Check durations are finite and non-negative.
    pub fn validate(&self) -> Result<(), PanoError> {
        for (name, value) in [
            ("inertia_duration", self.inertia_duration),
            ("reset_duration", self.reset_duration),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PanoError::invalid(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Current pan offset plus any running animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanState {
    /// Yaw in radians, positive turns the view left.
    pub yaw: f32,
    /// Pitch in radians, positive tilts the view up.
    pub pitch: f32,
    /// Whether vertical deltas are accumulated.
    pub vertical_enabled: bool,
    /// Running fling or reset, if any.
    pub animation: Option<PanAnimation>,
}

/// Converts pan deltas into a clamped yaw/pitch rotation.
#[derive(Debug)]
pub struct PanRotationController {
    state: PanState,
    settings: PanSettings,
    /// Bumped on every animation start and cancel.
    generation: u64,
    /// Latest time passed to any time-bearing call. Used to freeze an
    /// animation interrupted by a timeless call such as
    /// [`apply_pan_delta`](Self::apply_pan_delta).
    last_event_time: FrameTime,
}

impl PanRotationController {
    /// Controller at the zero offset.
    pub fn new(settings: PanSettings) -> Result<Self, PanoError> {
        settings.validate()?;
        let (yaw, pitch) = settings.clamp.apply(0.0, 0.0);
        Ok(Self {
            state: PanState {
                yaw,
                pitch,
                vertical_enabled: settings.vertical_enabled,
                animation: None,
            },
            settings,
            generation: 0,
            last_event_time: FrameTime::ZERO,
        })
    }

    /// Snapshot of the committed offset and running animation.
    pub fn state(&self) -> PanState {
        self.state
    }

    /// Active settings.
    pub fn settings(&self) -> &PanSettings {
        &self.settings
    }

    /// Replace the clamp. A running animation is frozen and the offset is
    /// pulled inside the new bounds.
    pub fn set_clamp(&mut self, clamp: RotationClamp) {
        let _ = self.stop_animations(self.last_event_time);
        self.settings.clamp = clamp;
        let (yaw, pitch) = clamp.apply(self.state.yaw, self.state.pitch);
        self.state.yaw = yaw;
        self.state.pitch = pitch;
    }

    /// Enable or disable vertical accumulation. Pitch keeps its value.
    pub fn set_vertical_rotation_enabled(&mut self, enabled: bool) {
        self.settings.vertical_enabled = enabled;
        self.state.vertical_enabled = enabled;
    }

    /// Accumulate a yaw/pitch delta in radians.
    ///
    /// Cancels a running animation first, freezing it at the last time seen
    /// by the controller. Non-finite deltas are ignored.
    pub fn apply_pan_delta(&mut self, dx: f32, dy: f32) {
        if !dx.is_finite() || !dy.is_finite() {
            log::warn!("Ignoring non-finite pan delta ({dx}, {dy})");
            return;
        }
        if self.state.animation.is_some() {
            let _ = self.stop_animations(self.last_event_time);
        }
        let pitch = if self.state.vertical_enabled {
            self.state.pitch + dy
        } else {
            self.state.pitch
        };
        let (yaw, pitch) = self.settings.clamp.apply(self.state.yaw + dx, pitch);
        self.state.yaw = yaw;
        self.state.pitch = pitch;
    }

    /// Start a fling with release `velocity` in radians per second.
    ///
    /// Models a constant deceleration to rest over the configured inertia
    /// duration; the landing point is clamped to the bounds.
    pub fn begin_inertia(
        &mut self,
        velocity: Vec2,
        now: FrameTime,
    ) -> Option<AnimationToken> {
        let _ = self.stop_animations(now);
        let duration = self.settings.inertia_duration;
        if duration <= 0.0 || !velocity.is_finite() {
            return None;
        }

        let travel = velocity * (duration as f32 * 0.5);
        let dy = if self.state.vertical_enabled {
            travel.y
        } else {
            0.0
        };
        let from = (self.state.yaw, self.state.pitch);
        let to = self.settings.clamp.apply(from.0 + travel.x, from.1 + dy);
        if to == from {
            return None;
        }
        Some(self.start_animation(
            AnimationKind::Inertia,
            from,
            to,
            now,
            duration,
            EasingFunction::QuadraticOut,
        ))
    }

    /// Cancel any running animation, freezing the offset at its value at
    /// `now`. Returns the cancelled animation's token.
    pub fn stop_animations(&mut self, now: FrameTime) -> Option<AnimationToken> {
        self.last_event_time = self.last_event_time.max(now);
        let animation = self.state.animation.take()?;
        let (yaw, pitch) = self.settings.clamp.apply_offset(animation.value_at(now));
        self.state.yaw = yaw;
        self.state.pitch = pitch;
        self.generation += 1;
        log::trace!("Cancelled {:?} animation {:?}", animation.kind, animation.token);
        Some(animation.token)
    }

    /// Return to the centered offset, animated or immediately.
    ///
    /// A running fling is cancelled first. The centre is clamped, so a
    /// range excluding zero resets to its nearest bound.
    pub fn reset_to_identity(
        &mut self,
        animated: bool,
        now: FrameTime,
    ) -> Option<AnimationToken> {
        let _ = self.stop_animations(now);
        let from = (self.state.yaw, self.state.pitch);
        let to = self.settings.clamp.apply(0.0, 0.0);
        let duration = self.settings.reset_duration;

        if !animated || duration <= 0.0 || from == to {
            self.state.yaw = to.0;
            self.state.pitch = to.1;
            return None;
        }
        Some(self.start_animation(
            AnimationKind::Reset,
            from,
            to,
            now,
            duration,
            self.settings.reset_easing,
        ))
    }

    /// Offset `(yaw, pitch)` at `time`. Pure: does not advance state.
    pub fn current_offset(&self, time: FrameTime) -> (f32, f32) {
        match &self.state.animation {
            Some(animation) => self.settings.clamp.apply_offset(animation.value_at(time)),
            None => (self.state.yaw, self.state.pitch),
        }
    }

    /// Local user rotation at `time`: yaw about +Y, then pitch about the
    /// yawed +X.
    pub fn rotation(&self, time: FrameTime) -> Quat {
        let (yaw, pitch) = self.current_offset(time);
        Quat::from_rotation_y(yaw) * Quat::from_rotation_x(pitch)
    }

    /// Whether an animation is still running at `time`.
    pub fn is_animating(&self, time: FrameTime) -> bool {
        self.state
            .animation
            .is_some_and(|animation| !animation.is_finished(time))
    }

    /// Retire a finished animation, folding its target into the offset.
    ///
    /// Reports each animation at most once. Cancelled animations are never
    /// reported.
    pub fn poll_finished(&mut self, time: FrameTime) -> Option<(AnimationKind, AnimationToken)> {
        let animation = self.state.animation?;
        if animation.token != AnimationToken(self.generation) || !animation.is_finished(time) {
            return None;
        }
        self.state.animation = None;
        let (yaw, pitch) = self.settings.clamp.apply_offset(animation.to);
        self.state.yaw = yaw;
        self.state.pitch = pitch;
        Some((animation.kind, animation.token))
    }

    fn start_animation(
        &mut self,
        kind: AnimationKind,
        from: (f32, f32),
        to: (f32, f32),
        now: FrameTime,
        duration: f64,
        easing: EasingFunction,
    ) -> AnimationToken {
        self.generation += 1;
        self.last_event_time = self.last_event_time.max(now);
        let token = AnimationToken(self.generation);
        self.state.animation = Some(PanAnimation {
            kind,
            token,
            from,
            to,
            start_time: now,
            duration,
            easing,
        });
        token
    }
}

/// Shared, lock-protected pan controller.
///
/// Clones refer to the same controller: one goes to the input thread, one
/// stays with the orientation node.
#[derive(Debug, Clone)]
pub struct PanHandle {
    inner: Arc<Mutex<PanRotationController>>,
}

impl PanHandle {
    /// Wrap a controller.
    pub fn new(controller: PanRotationController) -> Self {
        Self {
            inner: Arc::new(Mutex::new(controller)),
        }
    }

    /// Lock the controller for several steps that must appear atomic.
    pub fn lock(&self) -> MutexGuard<'_, PanRotationController> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// See [`PanRotationController::apply_pan_delta`].
    pub fn apply_pan_delta(&self, dx: f32, dy: f32) {
        self.lock().apply_pan_delta(dx, dy);
    }

    /// See [`PanRotationController::begin_inertia`].
    pub fn begin_inertia(&self, velocity: Vec2, now: FrameTime) -> Option<AnimationToken> {
        self.lock().begin_inertia(velocity, now)
    }

    /// See [`PanRotationController::stop_animations`].
    pub fn stop_animations(&self, now: FrameTime) -> Option<AnimationToken> {
        self.lock().stop_animations(now)
    }

    /// See [`PanRotationController::reset_to_identity`].
    pub fn reset_to_identity(&self, animated: bool, now: FrameTime) -> Option<AnimationToken> {
        self.lock().reset_to_identity(animated, now)
    }

    /// See [`PanRotationController::current_offset`].
    pub fn current_offset(&self, time: FrameTime) -> (f32, f32) {
        self.lock().current_offset(time)
    }
}
