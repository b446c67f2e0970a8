//! Horizon correction for host display rotation.
//!
//! When the host UI rotates (portrait to landscape and so on) the screen's
//! up axis no longer matches the device's. The
//! [`InterfaceOrientationUpdater`] publishes a roll correction into an
//! [`InterfaceCorrection`] cell that the orientation node folds into its
//! composition on the next frame.

/// In-process host display with manual orientation changes.
pub mod host;

use std::f32::consts::{FRAC_PI_2, PI};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use glam::Quat;
use serde::{Deserialize, Serialize};

pub use host::ManualHostDisplay;

use crate::util::{EasingFunction, FrameTime};

/// Orientation of the host user interface relative to the device.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum InterfaceOrientation {
    /// Home indicator at the bottom.
    #[default]
    Portrait,
    /// Home indicator at the top.
    PortraitUpsideDown,
    /// Device rotated so the home indicator is on the right.
    LandscapeLeft,
    /// Device rotated so the home indicator is on the left.
    LandscapeRight,
}

impl InterfaceOrientation {
    /// Roll about the view axis that keeps the horizon level.
    pub fn correction(self) -> Quat {
        let angle = match self {
            InterfaceOrientation::Portrait => 0.0,
            InterfaceOrientation::PortraitUpsideDown => PI,
            InterfaceOrientation::LandscapeLeft => FRAC_PI_2,
            InterfaceOrientation::LandscapeRight => -FRAC_PI_2,
        };
        Quat::from_rotation_z(angle)
    }
}

/// Timing of a host-driven rotation animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionContext {
    /// Frame time the host animation started.
    pub start: FrameTime,
    /// Host animation length in seconds.
    pub duration: f64,
    /// Host animation curve.
    pub easing: EasingFunction,
}

/// A correction published for the node to pick up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrectionUpdate {
    /// Monotonic publish counter.
    pub revision: u64,
    /// Target roll correction.
    pub rotation: Quat,
    /// How to reach it; `None` snaps.
    pub transition: Option<TransitionContext>,
}

/// Shared cell carrying the latest interface correction to the render
/// thread.
#[derive(Debug, Clone)]
pub struct InterfaceCorrection {
    inner: Arc<Mutex<CorrectionUpdate>>,
}

impl InterfaceCorrection {
    /// Cell holding the identity correction at revision zero.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(CorrectionUpdate {
                revision: 0,
                rotation: Quat::IDENTITY,
                transition: None,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CorrectionUpdate> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publish a new correction.
    pub fn publish(&self, rotation: Quat, transition: Option<TransitionContext>) {
        let mut state = self.lock();
        state.revision += 1;
        state.rotation = rotation;
        state.transition = transition;
    }

    /// Latest update if newer than `revision`.
    pub fn latest_since(&self, revision: u64) -> Option<CorrectionUpdate> {
        let state = self.lock();
        (state.revision > revision).then_some(*state)
    }
}

impl Default for InterfaceCorrection {
    fn default() -> Self {
        Self::new()
    }
}

/// Token returned by [`HostDisplay::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Callback invoked with the new orientation on every host rotation.
pub type OrientationListener = Arc<dyn Fn(InterfaceOrientation) + Send + Sync>;

/// Host display-rotation boundary.
pub trait HostDisplay: Send + Sync {
    /// Current interface orientation.
    fn interface_orientation(&self) -> InterfaceOrientation;

    /// Register a change listener.
    fn subscribe(&self, listener: OrientationListener) -> SubscriptionId;

    /// Remove a listener. Unknown ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);
}

/// Keeps the interface correction in sync with the host display.
pub struct InterfaceOrientationUpdater {
    host: Arc<dyn HostDisplay>,
    correction: InterfaceCorrection,
    subscription: Option<SubscriptionId>,
}

impl InterfaceOrientationUpdater {
    /// Updater writing into `correction` (usually the node's cell).
    pub fn new(host: Arc<dyn HostDisplay>, correction: InterfaceCorrection) -> Self {
        Self {
            host,
            correction,
            subscription: None,
        }
    }

    /// Recompute the correction now; the node snaps to it next frame.
    pub fn update_interface_orientation(&self) {
        let orientation = self.host.interface_orientation();
        log::debug!("Interface orientation now {orientation:?}");
        self.correction.publish(orientation.correction(), None);
    }

    /// Recompute the correction and animate to it in lockstep with the
    /// host's rotation transition.
    pub fn update_interface_orientation_with(&self, transition: TransitionContext) {
        let orientation = self.host.interface_orientation();
        log::debug!(
            "Interface orientation now {orientation:?} over {:.3}s",
            transition.duration
        );
        self.correction
            .publish(orientation.correction(), Some(transition));
    }

    /// Follow host rotation notifications. Calling again is a no-op.
    pub fn start_automatic_updates(&mut self) {
        if self.subscription.is_some() {
            return;
        }
        let correction = self.correction.clone();
        let id = self.host.subscribe(Arc::new(move |orientation: InterfaceOrientation| {
            correction.publish(orientation.correction(), None);
        }));
        log::debug!("Subscribed to interface orientation changes ({id:?})");
        self.subscription = Some(id);
    }

    /// Stop following host notifications. Calling again is a no-op.
    pub fn stop_automatic_updates(&mut self) {
        if let Some(id) = self.subscription.take() {
            self.host.unsubscribe(id);
            log::debug!("Unsubscribed from interface orientation changes ({id:?})");
        }
    }

    /// Whether host notifications are being followed.
    pub fn is_updating_automatically(&self) -> bool {
        self.subscription.is_some()
    }
}

impl Drop for InterfaceOrientationUpdater {
    fn drop(&mut self) {
        self.stop_automatic_updates();
    }
}
