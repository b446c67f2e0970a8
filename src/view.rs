//! Embeddable panorama view.
//!
//! [`PanoramaView`] owns one [`OrientationNode`], its pan controller, the
//! frame coordinator and the interface updater, and exposes the handful of
//! knobs a host needs: rotation limits, field of view, tracking, pause and
//! reset. The host calls [`PanoramaView::render_frame`] once per display
//! frame on its render thread; input and sensor threads talk to the view
//! through [`PanoramaView::pan_handle`] and [`PanoramaView::sensor_feed`].

use std::sync::Arc;

use crate::engine::{
    CommittedFrame, FrameUpdateCoordinator, PoseObserver, RendererHooks,
};
use crate::error::PanoError;
use crate::gesture::{PanGestureAdapter, PanHandle, PanRotationController};
use crate::interface::{HostDisplay, InterfaceOrientationUpdater, TransitionContext};
use crate::node::{OrientationNode, PointOfView, SceneHandle};
use crate::options::Options;
use crate::rotation::{RotationClamp, RotationRange};
use crate::sensor::{DeviceOrientationProvider, SensorFeed};
use crate::util::FrameTime;

/// A 360° panorama viewer driven by device attitude and pan gestures.
pub struct PanoramaView {
    node: OrientationNode,
    coordinator: FrameUpdateCoordinator,
    interface: InterfaceOrientationUpdater,
    feed: SensorFeed,
    tracking_enabled: bool,
    playing: bool,
    pan_sensitivity: f32,
    /// Reset requested since the last frame; `true` when animated.
    pending_reset: Option<bool>,
}

impl PanoramaView {
    /// Build a view from `options`, following rotations of `host`.
    ///
    /// Fails with [`PanoError::InvalidParameter`] when an option is out of
    /// range.
    pub fn new(options: &Options, host: Arc<dyn HostDisplay>) -> Result<Self, PanoError> {
        options.validate()?;
        let pan = PanHandle::new(PanRotationController::new(options.pan_settings()?)?);
        let node = OrientationNode::new(pan, options.node_settings()?)?;
        let interface = InterfaceOrientationUpdater::new(host, node.interface_correction());
        let mut view = Self {
            node,
            coordinator: FrameUpdateCoordinator::new(options.coordinator_settings()),
            interface,
            feed: SensorFeed::new(),
            tracking_enabled: false,
            playing: true,
            pan_sensitivity: options.rotation.pan_sensitivity,
            pending_reset: None,
        };
        view.set_device_orientation_tracking_enabled(
            options.frame.device_orientation_tracking,
        );
        view.interface.update_interface_orientation();
        Ok(view)
    }

    // -- Scene -------------------------------------------------------------

    /// Show the panorama in `scene`, or detach with `None`.
    pub fn set_scene(&mut self, scene: Option<Box<dyn SceneHandle>>) {
        match scene {
            Some(scene) => self.node.attach_to_scene(scene),
            None => self.node.detach_from_scene(),
        }
    }

    /// The composition node.
    pub fn node(&self) -> &OrientationNode {
        &self.node
    }

    // -- Rotation limits ---------------------------------------------------

    /// Enable or disable pitch changes from vertical drags.
    pub fn set_vertical_panning_enabled(&mut self, enabled: bool) {
        self.node.pan().lock().set_vertical_rotation_enabled(enabled);
    }

    /// Limit yaw to `[min, max]` degrees.
    ///
    /// An invalid range is rejected and the previous one stays in force.
    pub fn set_horizontal_rotation_angles(&mut self, min: f32, max: f32) -> Result<(), PanoError> {
        let horizontal = RotationRange::from_degrees(min, max)?;
        self.update_clamp(|clamp| clamp.horizontal = horizontal);
        Ok(())
    }

    /// Limit pitch to `[min, max]` degrees.
    ///
    /// An invalid range is rejected and the previous one stays in force.
    pub fn set_vertical_rotation_angles(&mut self, min: f32, max: f32) -> Result<(), PanoError> {
        let vertical = RotationRange::from_degrees(min, max)?;
        self.update_clamp(|clamp| clamp.vertical = vertical);
        Ok(())
    }

    fn update_clamp(&mut self, change: impl FnOnce(&mut RotationClamp)) {
        let mut pan = self.node.pan().lock();
        let mut clamp = pan.settings().clamp;
        change(&mut clamp);
        pan.set_clamp(clamp);
    }

    // -- Camera ------------------------------------------------------------

    /// Vertical field of view in degrees.
    pub fn fov(&self) -> f32 {
        self.node.field_of_view()
    }

    /// Set the vertical field of view in degrees.
    pub fn set_fov(&mut self, degrees: f32) -> Result<(), PanoError> {
        self.node.set_field_of_view(degrees)
    }

    /// Gesture adapter for a viewport `viewport_height` points tall at the
    /// current field of view.
    pub fn gesture_adapter(&self, viewport_height: f32) -> PanGestureAdapter {
        PanGestureAdapter::new(viewport_height, self.fov(), self.pan_sensitivity)
    }

    // -- Device tracking ---------------------------------------------------

    /// Whether the device attitude drives the view.
    pub fn is_device_orientation_tracking_enabled(&self) -> bool {
        self.tracking_enabled
    }

    /// Follow the device attitude, or run pan-only when disabled.
    pub fn set_device_orientation_tracking_enabled(&mut self, enabled: bool) {
        if enabled == self.tracking_enabled {
            return;
        }
        self.tracking_enabled = enabled;
        let provider: Option<Box<dyn DeviceOrientationProvider>> = if enabled {
            Some(Box::new(self.feed.provider()))
        } else {
            None
        };
        self.node.set_device_orientation_provider(provider);
    }

    /// Feed the sensor thread pushes samples into.
    pub fn sensor_feed(&self) -> SensorFeed {
        self.feed.clone()
    }

    // -- Input -------------------------------------------------------------

    /// Shared pan controller for the input thread.
    pub fn pan_handle(&self) -> PanHandle {
        self.node.pan().clone()
    }

    /// Recentre the view on the next frame, gliding back when `animated`.
    ///
    /// A running fling or reset stops right away, frozen at the pose last
    /// shown. The glide home starts at the next frame's timestamp.
    pub fn set_needs_reset_rotation(&mut self, animated: bool) {
        let shown = self
            .coordinator
            .last_committed()
            .map_or(FrameTime::ZERO, |frame| frame.info.time);
        let _ = self.node.pan().stop_animations(shown);
        self.pending_reset = Some(animated);
    }

    // -- Playback ----------------------------------------------------------

    /// Whether frames are being composed.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Pause or resume. A paused view keeps re-publishing its last pose.
    pub fn set_playing(&mut self, playing: bool) {
        if playing != self.playing {
            log::info!("Panorama view {}", if playing { "resumed" } else { "paused" });
        }
        self.playing = playing;
    }

    // -- Host lifecycle ----------------------------------------------------

    /// The view entered (`true`) or left (`false`) a window.
    ///
    /// Entering follows host rotations and takes the current orientation
    /// immediately; leaving stops following.
    pub fn will_move_to_window(&mut self, attached: bool) {
        if attached {
            self.interface.start_automatic_updates();
            self.interface.update_interface_orientation();
        } else {
            self.interface.stop_automatic_updates();
        }
    }

    /// Re-read the host orientation, animating along `transition` when the
    /// host is mid-rotation.
    pub fn update_interface_orientation(&self, transition: Option<TransitionContext>) {
        match transition {
            Some(transition) => self.interface.update_interface_orientation_with(transition),
            None => self.interface.update_interface_orientation(),
        }
    }

    // -- Frames ------------------------------------------------------------

    /// Install or remove render hooks.
    pub fn set_render_hooks(&mut self, hooks: Option<Box<dyn RendererHooks>>) {
        self.coordinator.set_hooks(hooks);
    }

    /// Take the reader other threads use to follow committed poses.
    pub fn take_pose_observer(&mut self) -> Option<PoseObserver> {
        self.coordinator.take_observer()
    }

    /// Frame coordinator, for forwarding the host's render notifications.
    pub fn coordinator_mut(&mut self) -> &mut FrameUpdateCoordinator {
        &mut self.coordinator
    }

    /// Pose of the last committed frame.
    pub fn point_of_view(&self) -> Option<PointOfView> {
        self.coordinator
            .last_committed()
            .map(|frame| frame.point_of_view)
    }

    /// Compose and commit the frame for `time`.
    pub fn render_frame(&mut self, time: FrameTime) -> CommittedFrame {
        if let Some(animated) = self.pending_reset.take() {
            self.node.set_needs_reset_rotation(animated, time);
        }
        if self.playing {
            self.coordinator.update(&mut self.node, time)
        } else {
            self.coordinator.hold(&self.node, time)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;
    use std::sync::Mutex;

    use glam::{Quat, Vec2};

    use super::*;
    use crate::interface::{InterfaceOrientation, ManualHostDisplay};
    use crate::node::{EyeMask, NodeId};
    use crate::sensor::Orientation;

    fn t(s: f64) -> FrameTime {
        FrameTime::from_secs(s)
    }

    fn view_with(options: &Options) -> (Arc<ManualHostDisplay>, PanoramaView) {
        let host = Arc::new(ManualHostDisplay::new(InterfaceOrientation::Portrait));
        let view = PanoramaView::new(options, host.clone()).unwrap();
        (host, view)
    }

    fn view() -> (Arc<ManualHostDisplay>, PanoramaView) {
        view_with(&Options::default())
    }

    fn close(a: Quat, b: Quat) -> bool {
        a.angle_between(b) < 1e-4
    }

    #[test]
    fn defaults_match_a_fresh_panorama() {
        let (_, mut view) = view();
        assert!(view.is_playing());
        assert!(view.is_device_orientation_tracking_enabled());
        assert_eq!(view.fov(), 60.0);

        let frame = view.render_frame(t(0.0));
        assert_eq!(frame.point_of_view.eye_mask, EyeMask::MONO);
        assert_eq!(frame.point_of_view.rotation, Quat::IDENTITY);

        view.pan_handle().apply_pan_delta(0.0, 3.0);
        let (_, pitch) = view.pan_handle().current_offset(t(0.0));
        assert!((pitch - 60f32.to_radians()).abs() < 1e-5);
    }

    #[test]
    fn horizontal_angles_are_degrees() {
        let (_, mut view) = view();
        view.set_horizontal_rotation_angles(-90.0, 90.0).unwrap();
        view.pan_handle().apply_pan_delta(3.0, 0.0);
        let (yaw, _) = view.pan_handle().current_offset(t(0.0));
        assert!((yaw - FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn invalid_angles_keep_previous_limits() {
        let (_, mut view) = view();
        assert!(view.set_vertical_rotation_angles(10.0, -10.0).is_err());
        let clamp = view.pan_handle().lock().settings().clamp;
        assert!((clamp.vertical.max() - 60f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn vertical_panning_can_be_disabled() {
        let (_, mut view) = view();
        view.set_vertical_panning_enabled(false);
        view.pan_handle().apply_pan_delta(0.2, 0.4);
        assert_eq!(view.pan_handle().current_offset(t(0.0)), (0.2, 0.0));
    }

    #[test]
    fn tracking_toggle_swaps_provider() {
        let (_, mut view) = view();
        let feed = view.sensor_feed();
        let device = Quat::from_rotation_y(0.7);
        feed.push(Orientation::new(device, t(0.0)));

        let tracked = view.render_frame(t(0.0));
        assert!(close(tracked.point_of_view.rotation, device));

        view.set_device_orientation_tracking_enabled(false);
        assert!(view.node().device_orientation_provider().is_none());
        let pan_only = view.render_frame(t(0.1));
        assert_eq!(pan_only.point_of_view.rotation, Quat::IDENTITY);

        view.set_device_orientation_tracking_enabled(true);
        assert!(view.node().device_orientation_provider().is_some());
    }

    #[test]
    fn paused_view_holds_its_pose() {
        let mut options = Options::default();
        options.frame.device_orientation_tracking = false;
        let (_, mut view) = view_with(&options);
        view.pan_handle().apply_pan_delta(0.3, 0.0);
        let live = view.render_frame(t(0.0));

        view.set_playing(false);
        view.pan_handle().apply_pan_delta(0.3, 0.0);
        let held = view.render_frame(t(0.5));
        assert_eq!(held.point_of_view, live.point_of_view);

        view.set_playing(true);
        let resumed = view.render_frame(t(1.0));
        assert!(close(resumed.point_of_view.rotation, Quat::from_rotation_y(0.6)));
    }

    #[test]
    fn reset_applies_on_next_frame() {
        let mut options = Options::default();
        options.frame.device_orientation_tracking = false;
        let (_, mut view) = view_with(&options);
        view.pan_handle().apply_pan_delta(0.5, 0.2);
        let _ = view.render_frame(t(0.0));

        view.set_needs_reset_rotation(false);
        assert_ne!(view.pan_handle().current_offset(t(0.0)), (0.0, 0.0));
        let frame = view.render_frame(t(0.1));
        assert!(close(frame.point_of_view.rotation, Quat::IDENTITY));
    }

    #[test]
    fn animated_reset_glides_home() {
        let mut options = Options::default();
        options.frame.device_orientation_tracking = false;
        let (_, mut view) = view_with(&options);
        view.pan_handle().apply_pan_delta(0.5, 0.0);
        view.set_needs_reset_rotation(true);
        let start = view.render_frame(t(0.0));
        assert!(close(start.point_of_view.rotation, Quat::from_rotation_y(0.5)));
        let end = view.render_frame(t(1.0));
        assert!(close(end.point_of_view.rotation, Quat::IDENTITY));
    }

    #[test]
    fn reset_request_stops_a_fling_before_the_next_frame() {
        let mut options = Options::default();
        options.frame.device_orientation_tracking = false;
        let (_, mut view) = view_with(&options);
        let pan = view.pan_handle();
        assert!(pan.begin_inertia(Vec2::new(2.0, 0.0), t(0.0)).is_some());
        let shown = view.render_frame(t(0.1));

        view.set_needs_reset_rotation(true);
        assert!(!pan.lock().is_animating(t(0.1)));
        let frozen = pan.current_offset(t(0.5));
        assert!(frozen.0 > 0.0);
        assert!(close(shown.point_of_view.rotation, Quat::from_rotation_y(frozen.0)));

        let start = view.render_frame(t(0.2));
        assert!(close(start.point_of_view.rotation, Quat::from_rotation_y(frozen.0)));
        assert!(pan.lock().is_animating(t(0.2)));
        let end = view.render_frame(t(1.0));
        assert!(close(end.point_of_view.rotation, Quat::IDENTITY));
    }

    #[test]
    fn window_lifecycle_follows_host_rotation() {
        let mut options = Options::default();
        options.frame.device_orientation_tracking = false;
        let (host, mut view) = view_with(&options);

        view.will_move_to_window(true);
        assert_eq!(host.listener_count(), 1);
        host.set_orientation(InterfaceOrientation::LandscapeLeft);
        let frame = view.render_frame(t(0.0));
        assert!(close(frame.point_of_view.rotation, Quat::from_rotation_z(FRAC_PI_2)));

        view.will_move_to_window(false);
        assert_eq!(host.listener_count(), 0);
        host.set_orientation(InterfaceOrientation::Portrait);
        let frame = view.render_frame(t(0.1));
        assert!(close(frame.point_of_view.rotation, Quat::from_rotation_z(FRAC_PI_2)));
    }

    #[test]
    fn fov_changes_reach_the_gesture_adapter() {
        let (_, mut view) = view();
        assert!(view.set_fov(-5.0).is_err());
        view.set_fov(90.0).unwrap();
        let adapter = view.gesture_adapter(900.0);
        assert!((adapter.radians_per_point() - 90f32.to_radians() / 900.0).abs() < 1e-9);

        let pan = view.pan_handle();
        pan.handle_event(
            &adapter,
            crate::gesture::PanEvent::Changed {
                delta: Vec2::new(450.0, 0.0),
                time: t(0.0),
            },
        );
        let (yaw, _) = pan.current_offset(t(0.0));
        assert!((yaw - 45f32.to_radians()).abs() < 1e-5);
    }

    struct SharedScene(Arc<Mutex<Vec<(bool, NodeId)>>>);

    impl SceneHandle for SharedScene {
        fn attach(&mut self, node: NodeId) {
            self.0.lock().unwrap().push((true, node));
        }

        fn detach(&mut self, node: NodeId) {
            self.0.lock().unwrap().push((false, node));
        }
    }

    #[test]
    fn scene_swap_detaches_previous() {
        let (_, mut view) = view();
        let log = Arc::new(Mutex::new(Vec::new()));
        view.set_scene(Some(Box::new(SharedScene(log.clone()))));
        view.set_scene(Some(Box::new(SharedScene(log.clone()))));
        view.set_scene(None);
        let id = view.node().id();
        assert_eq!(
            *log.lock().unwrap(),
            vec![(true, id), (false, id), (true, id), (false, id)]
        );
        assert!(!view.node().is_attached());
    }
}
