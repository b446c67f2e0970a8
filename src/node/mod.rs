//! The orientation node: composition root of the camera transform.
//!
//! The point of view is built from four independently owned rotations in a
//! fixed order:
//!
//! ```text
//! pose = reference * device * interface * user
//! ```
//!
//! - `reference`: world-yaw re-centre captured on reset
//! - `device`: world-relative sensor attitude
//! - `interface`: roll that keeps the horizon level under host rotation
//! - `user`: local pan rotation (yaw about +Y, then pitch about +X)
//!
//! The pan offset therefore always turns the view about the screen's own
//! axes, whatever the device attitude.

/// Time-interpolated rotation values.
pub mod animated;
/// Stereo eye masks and per-eye cameras.
pub mod eye;
/// Explicit host scene attachment.
pub mod scene;

use glam::{Mat4, Quat, Vec3};

pub use animated::AnimatedRotation;
pub use eye::{Eye, EyeCamera, EyeMask};
pub use scene::{NodeId, SceneHandle};

use crate::engine::Transaction;
use crate::error::PanoError;
use crate::gesture::PanHandle;
use crate::interface::InterfaceCorrection;
use crate::sensor::DeviceOrientationProvider;
use crate::util::{EasingFunction, FrameTime};

/// Horizontal extent below which a forward vector has no usable heading.
const HEADING_EPSILON: f32 = 1e-4;

/// Camera state handed to the renderer for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointOfView {
    /// Composed camera orientation.
    pub rotation: Quat,
    /// Vertical field of view in degrees.
    pub field_of_view: f32,
    /// Categories the mono camera renders.
    pub eye_mask: EyeMask,
}

impl PointOfView {
    /// Identity pose with the given projection settings.
    pub fn identity(field_of_view: f32, eye_mask: EyeMask) -> Self {
        Self {
            rotation: Quat::IDENTITY,
            field_of_view,
            eye_mask,
        }
    }

    /// View matrix (inverse of camera world transform). The camera sits at
    /// the origin and only rotates.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_quat(self.rotation.conjugate())
    }

    /// Perspective projection for the given viewport aspect.
    pub fn projection_matrix(&self, aspect: f32, znear: f32, zfar: f32) -> Mat4 {
        Mat4::perspective_rh(self.field_of_view.to_radians(), aspect, znear, zfar)
    }

    /// Camera forward direction in world space.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Whether the pose can be handed to a renderer.
    pub fn is_valid(&self) -> bool {
        self.rotation.is_finite()
            && self.rotation.is_normalized()
            && self.field_of_view.is_finite()
            && self.field_of_view > 0.0
    }
}

/// Static node settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeSettings {
    /// Vertical field of view in degrees.
    pub field_of_view: f32,
    /// Distance between the stereo eyes in meters.
    pub eye_separation: f32,
    /// Whether reset also re-centres the device heading.
    pub recenter_heading_on_reset: bool,
    /// Length of an animated heading re-centre in seconds.
    pub reset_duration: f64,
}

impl Default for NodeSettings {
    fn default() -> Self {
        Self {
            field_of_view: 60.0,
            eye_separation: 0.064,
            recenter_heading_on_reset: true,
            reset_duration: 0.3,
        }
    }
}

impl NodeSettings {
    /// Check the field of view is positive and the eye separation and
    /// reset duration are non-negative.
    pub fn validate(&self) -> Result<(), PanoError> {
        check_field_of_view(self.field_of_view)?;
        if !self.eye_separation.is_finite() || self.eye_separation < 0.0 {
            return Err(PanoError::invalid(format!(
                "eye separation must be non-negative, got {}",
                self.eye_separation
            )));
        }
        if !self.reset_duration.is_finite() || self.reset_duration < 0.0 {
            return Err(PanoError::invalid(format!(
                "reset duration must be non-negative, got {}",
                self.reset_duration
            )));
        }
        Ok(())
    }
}

fn check_field_of_view(degrees: f32) -> Result<(), PanoError> {
    if !degrees.is_finite() || degrees <= 0.0 {
        return Err(PanoError::invalid(format!(
            "field of view must be positive, got {degrees}"
        )));
    }
    Ok(())
}

/// Heading (rotation about +Y) of a world attitude, if it has one.
fn heading(rotation: Quat) -> Option<f32> {
    let forward = rotation * Vec3::NEG_Z;
    let horizontal = forward.x.hypot(forward.z);
    (horizontal > HEADING_EPSILON).then(|| (-forward.x).atan2(-forward.z))
}

/// Composition root combining device and user rotation into one pose.
pub struct OrientationNode {
    id: NodeId,
    reference_rotation: AnimatedRotation,
    device_rotation: AnimatedRotation,
    interface_rotation: AnimatedRotation,
    user_rotation: Quat,
    pan: PanHandle,
    provider: Option<Box<dyn DeviceOrientationProvider>>,
    /// Timestamp of the last applied sensor sample.
    device_sample_time: Option<FrameTime>,
    interface_correction: InterfaceCorrection,
    interface_revision: u64,
    field_of_view: f32,
    eye_mask: EyeMask,
    settings: NodeSettings,
    scene: Option<Box<dyn SceneHandle>>,
}

impl OrientationNode {
    /// Node reading its user rotation from `pan`.
    ///
    /// Fails with [`PanoError::InvalidParameter`] for a non-positive field
    /// of view or a negative eye separation.
    pub fn new(pan: PanHandle, settings: NodeSettings) -> Result<Self, PanoError> {
        settings.validate()?;
        Ok(Self {
            id: NodeId::next(),
            reference_rotation: AnimatedRotation::default(),
            device_rotation: AnimatedRotation::default(),
            interface_rotation: AnimatedRotation::default(),
            user_rotation: Quat::IDENTITY,
            pan,
            provider: None,
            device_sample_time: None,
            interface_correction: InterfaceCorrection::new(),
            interface_revision: 0,
            field_of_view: settings.field_of_view,
            eye_mask: EyeMask::MONO,
            settings,
            scene: None,
        })
    }

    /// Scene identity of this node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Shared pan controller feeding the user rotation.
    pub fn pan(&self) -> &PanHandle {
        &self.pan
    }

    /// Cell an [`InterfaceOrientationUpdater`](crate::interface::InterfaceOrientationUpdater)
    /// writes into.
    pub fn interface_correction(&self) -> InterfaceCorrection {
        self.interface_correction.clone()
    }

    // -- Device orientation ------------------------------------------------

    /// Install or remove the sensor. Without one the node is pan-only and
    /// the device rotation returns to identity.
    pub fn set_device_orientation_provider(
        &mut self,
        provider: Option<Box<dyn DeviceOrientationProvider>>,
    ) {
        log::info!(
            "Device orientation tracking {}",
            if provider.is_some() { "enabled" } else { "disabled" }
        );
        self.provider = provider;
        self.device_sample_time = None;
        self.device_rotation.snap(Quat::IDENTITY);
        self.reference_rotation.snap(Quat::IDENTITY);
    }

    /// Installed sensor, if any.
    pub fn device_orientation_provider(&self) -> Option<&dyn DeviceOrientationProvider> {
        self.provider.as_deref()
    }

    /// Timestamp of the last sensor sample applied, if any since the
    /// provider was installed.
    pub fn device_sample_time(&self) -> Option<FrameTime> {
        self.device_sample_time
    }

    /// Apply the provider's estimate at `time` to the device rotation.
    ///
    /// The first sample after installing a provider is always a hard cut.
    /// Returns whether a sample was applied.
    pub fn update_device_orientation(&mut self, time: FrameTime, txn: &Transaction) -> bool {
        let Some(provider) = self.provider.as_ref() else {
            return false;
        };
        let Some(sample) = provider.current_orientation(time) else {
            return false;
        };
        if !sample.is_valid() {
            log::warn!("Ignoring invalid device orientation {:?}", sample.rotation);
            return false;
        }
        let duration = if self.device_sample_time.is_some() {
            txn.effective_duration()
        } else {
            0.0
        };
        self.device_rotation
            .animate_to(sample.rotation, time, time, duration, txn.easing);
        self.device_sample_time = Some(sample.timestamp);
        true
    }

    // -- User and interface rotation ---------------------------------------

    /// Read the pan offset at `time` and apply it to the user rotation.
    pub fn update_user_rotation(&mut self, time: FrameTime) {
        self.user_rotation = self.pan.lock().rotation(time);
    }

    /// Fold a newly published interface correction into the node.
    pub fn update_interface_rotation(&mut self, time: FrameTime, txn: &Transaction) {
        let Some(update) = self.interface_correction.latest_since(self.interface_revision) else {
            return;
        };
        self.interface_revision = update.revision;
        match update.transition {
            Some(transition) if !txn.disable_actions => self.interface_rotation.animate_to(
                update.rotation,
                time,
                transition.start,
                transition.duration,
                transition.easing,
            ),
            _ => self.interface_rotation.snap(update.rotation),
        }
    }

    /// Reset the view to centre.
    ///
    /// Cancels pan animations and resets the pan offset through the
    /// controller. When configured, also re-centres the device heading so
    /// the current facing becomes forward.
    pub fn set_needs_reset_rotation(&mut self, animated: bool, now: FrameTime) {
        {
            let mut pan = self.pan.lock();
            let _ = pan.stop_animations(now);
            let _ = pan.reset_to_identity(animated, now);
        }
        if !self.settings.recenter_heading_on_reset || self.device_sample_time.is_none() {
            return;
        }
        let Some(yaw) = heading(self.device_rotation.target()) else {
            return;
        };
        let reference = Quat::from_rotation_y(-yaw);
        let duration = if animated {
            self.settings.reset_duration
        } else {
            0.0
        };
        self.reference_rotation
            .animate_to(reference, now, now, duration, EasingFunction::DEFAULT);
    }

    // -- Composition -------------------------------------------------------

    /// Composed camera orientation at `time`.
    pub fn rotation(&self, time: FrameTime) -> Quat {
        (self.reference_rotation.value_at(time)
            * self.device_rotation.value_at(time)
            * self.interface_rotation.value_at(time)
            * self.user_rotation)
            .normalize()
    }

    /// Point of view at `time`.
    pub fn point_of_view(&self, time: FrameTime) -> PointOfView {
        PointOfView {
            rotation: self.rotation(time),
            field_of_view: self.field_of_view,
            eye_mask: self.eye_mask,
        }
    }

    /// Left and right stereo cameras at `time`.
    pub fn eye_cameras(&self, time: FrameTime) -> [EyeCamera; 2] {
        let rotation = self.rotation(time);
        let separation = self.settings.eye_separation;
        [
            EyeCamera::new(Eye::Left, rotation, separation, self.field_of_view),
            EyeCamera::new(Eye::Right, rotation, separation, self.field_of_view),
        ]
    }

    /// Whether any sub-rotation is still gliding at `time`.
    pub fn is_animating(&self, time: FrameTime) -> bool {
        self.reference_rotation.is_animating(time)
            || self.device_rotation.is_animating(time)
            || self.interface_rotation.is_animating(time)
            || self.pan.lock().is_animating(time)
    }

    // -- Projection properties ---------------------------------------------

    /// Vertical field of view in degrees.
    pub fn field_of_view(&self) -> f32 {
        self.field_of_view
    }

    /// Set the vertical field of view in degrees. Rejects values `<= 0`.
    pub fn set_field_of_view(&mut self, degrees: f32) -> Result<(), PanoError> {
        check_field_of_view(degrees)?;
        self.field_of_view = degrees;
        Ok(())
    }

    /// Categories the mono camera renders.
    pub fn eye_mask(&self) -> EyeMask {
        self.eye_mask
    }

    /// Set the mono camera's categories.
    pub fn set_eye_mask(&mut self, mask: EyeMask) {
        self.eye_mask = mask;
    }

    // -- Scene lifecycle ---------------------------------------------------

    /// Attach to a scene, detaching from the previous one first.
    pub fn attach_to_scene(&mut self, mut scene: Box<dyn SceneHandle>) {
        self.detach_from_scene();
        scene.attach(self.id);
        log::debug!("Orientation node {:?} attached to scene", self.id);
        self.scene = Some(scene);
    }

    /// Detach from the current scene, if any.
    pub fn detach_from_scene(&mut self) {
        if let Some(mut scene) = self.scene.take() {
            scene.detach(self.id);
            log::debug!("Orientation node {:?} detached from scene", self.id);
        }
    }

    /// Whether the node is attached to a scene.
    pub fn is_attached(&self) -> bool {
        self.scene.is_some()
    }

    /// Tear the node down, detaching it from its scene.
    pub fn shutdown(mut self) {
        self.detach_from_scene();
    }
}

impl Drop for OrientationNode {
    fn drop(&mut self) {
        if self.scene.is_some() {
            log::warn!("Orientation node {:?} dropped while attached", self.id);
            self.detach_from_scene();
        }
    }
}
