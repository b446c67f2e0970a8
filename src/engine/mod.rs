//! Per-frame orchestration.
//!
//! [`FrameUpdateCoordinator::update`] runs once per displayed frame on the
//! render thread and walks a fixed sequence:
//!
//! ```text
//! Idle → SamplingDevice → Composing → Committed → Idle
//! ```
//!
//! Device orientation is always applied before the pan offset, both inside
//! a single [`Transaction`]. The committed frame is published through a
//! lock-free triple buffer so other threads only ever see whole, committed
//! poses.

/// Observer callbacks and frame metadata.
pub mod hooks;
/// Per-frame animation rules.
pub mod transaction;

use web_time::Duration;

pub use hooks::{FrameInfo, RendererHooks};
pub use transaction::{Transaction, DEFAULT_ANIMATION_DURATION};

use crate::node::{Eye, EyeCamera, OrientationNode, PointOfView};
use crate::util::FrameTime;

/// Longest the render thread blocks for a sensor sample by default.
pub const DEFAULT_MAX_SENSOR_WAIT: Duration = Duration::from_millis(50);

/// Step of the per-frame state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePhase {
    /// Between frames.
    Idle,
    /// Checking the sensor and, if needed, waiting for a sample.
    SamplingDevice,
    /// Applying device, interface and pan rotation.
    Composing,
    /// Pose published; hooks notified.
    Committed,
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommittedFrame {
    /// Frame timing.
    pub info: FrameInfo,
    /// Mono camera pose.
    pub point_of_view: PointOfView,
    /// Stereo sub-cameras.
    pub eyes: [EyeCamera; 2],
}

/// Coordinator tunables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinatorSettings {
    /// Implicit animation length for sensor updates, in seconds.
    pub default_animation_duration: f64,
    /// Upper bound on a sensor wait.
    pub max_sensor_wait: Duration,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            default_animation_duration: DEFAULT_ANIMATION_DURATION,
            max_sensor_wait: DEFAULT_MAX_SENSOR_WAIT,
        }
    }
}

/// Read side of the committed-pose triple buffer.
pub struct PoseObserver {
    output: triple_buffer::Output<Option<CommittedFrame>>,
}

impl PoseObserver {
    /// Most recently committed frame, if any frame has been committed.
    pub fn latest(&mut self) -> Option<CommittedFrame> {
        let _ = self.output.update();
        *self.output.output_buffer_mut()
    }
}

/// Drives one orientation node through the per-frame sequence.
pub struct FrameUpdateCoordinator {
    settings: CoordinatorSettings,
    phase: FramePhase,
    frame_index: u64,
    /// A sensor wait timed out; the next newer sample is a hard cut.
    awaiting_sample: bool,
    /// Timestamp of the sample held when the wait timed out.
    stale_sample_time: Option<FrameTime>,
    last_committed: Option<CommittedFrame>,
    hooks: Option<Box<dyn RendererHooks>>,
    publisher: triple_buffer::Input<Option<CommittedFrame>>,
    observer: Option<PoseObserver>,
}

impl FrameUpdateCoordinator {
    /// Coordinator with the given settings.
    pub fn new(settings: CoordinatorSettings) -> Self {
        let (publisher, output) = triple_buffer::triple_buffer(&None);
        Self {
            settings,
            phase: FramePhase::Idle,
            frame_index: 0,
            awaiting_sample: false,
            stale_sample_time: None,
            last_committed: None,
            hooks: None,
            publisher,
            observer: Some(PoseObserver { output }),
        }
    }

    /// Active settings.
    pub fn settings(&self) -> &CoordinatorSettings {
        &self.settings
    }

    /// Change the implicit animation length for sensor updates.
    pub fn set_default_animation_duration(&mut self, seconds: f64) {
        self.settings.default_animation_duration = seconds;
    }

    /// Current phase. Always [`FramePhase::Idle`] between calls to
    /// [`update`](Self::update).
    pub fn phase(&self) -> FramePhase {
        self.phase
    }

    /// Take the committed-pose reader. Only one exists.
    pub fn take_observer(&mut self) -> Option<PoseObserver> {
        self.observer.take()
    }

    /// Install or remove render hooks.
    pub fn set_hooks(&mut self, hooks: Option<Box<dyn RendererHooks>>) {
        self.hooks = hooks;
    }

    /// Last committed frame.
    pub fn last_committed(&self) -> Option<&CommittedFrame> {
        self.last_committed.as_ref()
    }

    fn enter(&mut self, phase: FramePhase) {
        log::trace!("frame {}: {:?} -> {:?}", self.frame_index, self.phase, phase);
        self.phase = phase;
    }

    /// Run one frame at `time` and return what was committed.
    ///
    /// Never fails: a frame whose composition is unusable re-commits the
    /// previous pose.
    pub fn update(&mut self, node: &mut OrientationNode, time: FrameTime) -> CommittedFrame {
        self.enter(FramePhase::SamplingDevice);
        let waited = self.sample_device(node, time);

        self.enter(FramePhase::Composing);
        let txn = Transaction {
            disable_actions: waited || self.awaiting_sample,
            ..Transaction::new(self.settings.default_animation_duration)
        };
        if node.update_device_orientation(time, &txn)
            && node.device_sample_time() > self.stale_sample_time
        {
            self.awaiting_sample = false;
        }
        node.update_interface_rotation(time, &txn);
        if let Some((kind, token)) = node.pan().lock().poll_finished(time) {
            log::debug!("{kind:?} animation {token:?} finished");
        }
        node.update_user_rotation(time);

        let info = FrameInfo {
            time,
            frame_index: self.frame_index,
            waited_for_sensor: waited,
        };
        if let Some(hooks) = self.hooks.as_mut() {
            hooks.did_apply_animations(&info);
        }

        let frame = self.compose_frame(node, info);

        self.enter(FramePhase::Committed);
        self.publisher.write(Some(frame));
        self.last_committed = Some(frame);
        if let Some(hooks) = self.hooks.as_mut() {
            hooks.update_at_time(&info);
        }

        self.frame_index += 1;
        self.enter(FramePhase::Idle);
        frame
    }

    /// Re-publish the last committed frame without touching the node, for a
    /// paused view. Commits an identity pose if nothing was committed yet.
    pub fn hold(&mut self, node: &OrientationNode, time: FrameTime) -> CommittedFrame {
        let info = FrameInfo {
            time,
            frame_index: self.frame_index,
            waited_for_sensor: false,
        };
        let frame = self.last_committed.map_or_else(
            || Self::fallback_frame(node, info),
            |previous| CommittedFrame { info, ..previous },
        );
        self.publisher.write(Some(frame));
        self.last_committed = Some(frame);
        self.frame_index += 1;
        frame
    }

    /// Forward the host's physics-step notification.
    pub fn notify_did_simulate_physics(&mut self) {
        if let (Some(hooks), Some(frame)) = (self.hooks.as_mut(), self.last_committed.as_ref()) {
            hooks.did_simulate_physics(&frame.info);
        }
    }

    /// Forward the host's pre-draw notification.
    pub fn notify_will_render(&mut self) {
        if let (Some(hooks), Some(frame)) = (self.hooks.as_mut(), self.last_committed.as_ref()) {
            hooks.will_render(&frame.info, &frame.point_of_view);
        }
    }

    /// Forward the host's post-draw notification.
    pub fn notify_did_render(&mut self) {
        if let (Some(hooks), Some(frame)) = (self.hooks.as_mut(), self.last_committed.as_ref()) {
            hooks.did_render(&frame.info);
        }
    }

    /// Returns whether the frame had to wait for the sensor.
    fn sample_device(&mut self, node: &OrientationNode, time: FrameTime) -> bool {
        let Some(provider) = node.device_orientation_provider() else {
            return false;
        };
        if !provider.should_wait(time) {
            return false;
        }
        if !provider.wait(time, self.settings.max_sensor_wait) {
            log::debug!(
                "No sensor sample within {:?} at {:.3}s",
                self.settings.max_sensor_wait,
                time.as_secs()
            );
            self.awaiting_sample = true;
            self.stale_sample_time = node.device_sample_time();
        }
        true
    }

    fn compose_frame(&self, node: &OrientationNode, info: FrameInfo) -> CommittedFrame {
        let point_of_view = node.point_of_view(info.time);
        if point_of_view.is_valid() {
            return CommittedFrame {
                info,
                point_of_view,
                eyes: node.eye_cameras(info.time),
            };
        }
        log::warn!(
            "Composition produced an unusable pose at {:.3}s; holding previous frame",
            info.time.as_secs()
        );
        self.last_committed.map_or_else(
            || Self::fallback_frame(node, info),
            |previous| CommittedFrame { info, ..previous },
        )
    }

    fn fallback_frame(node: &OrientationNode, info: FrameInfo) -> CommittedFrame {
        let point_of_view = PointOfView::identity(node.field_of_view(), node.eye_mask());
        let fov = node.field_of_view();
        CommittedFrame {
            info,
            point_of_view,
            eyes: [
                EyeCamera::new(Eye::Left, point_of_view.rotation, 0.0, fov),
                EyeCamera::new(Eye::Right, point_of_view.rotation, 0.0, fov),
            ],
        }
    }
}

impl Default for FrameUpdateCoordinator {
    fn default() -> Self {
        Self::new(CoordinatorSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::thread;

    use glam::{Quat, Vec2};
    use web_time::Instant;

    use super::*;
    use crate::gesture::{PanHandle, PanRotationController, PanSettings};
    use crate::node::NodeSettings;
    use crate::sensor::{DeviceOrientationProvider, Orientation, SensorFeed};

    fn t(s: f64) -> FrameTime {
        FrameTime::from_secs(s)
    }

    fn node() -> OrientationNode {
        let pan = PanHandle::new(PanRotationController::new(PanSettings::default()).unwrap());
        OrientationNode::new(pan, NodeSettings::default()).unwrap()
    }

    fn close(a: Quat, b: Quat) -> bool {
        a.angle_between(b) < 1e-4
    }

    #[test]
    fn pan_only_frames_follow_the_controller() {
        let mut node = node();
        let mut coordinator = FrameUpdateCoordinator::default();
        node.pan().apply_pan_delta(0.3, 0.0);
        let frame = coordinator.update(&mut node, t(0.0));
        assert!(close(frame.point_of_view.rotation, Quat::from_rotation_y(0.3)));
        assert!(!frame.info.waited_for_sensor);
        assert_eq!(coordinator.phase(), FramePhase::Idle);
    }

    #[test]
    fn pan_offset_is_read_fresh_every_frame() {
        let mut node = node();
        let mut coordinator = FrameUpdateCoordinator::default();
        let _ = node.pan().begin_inertia(Vec2::new(1.0, 0.0), t(0.0));
        let a = coordinator.update(&mut node, t(0.1)).point_of_view.rotation;
        let b = coordinator.update(&mut node, t(0.2)).point_of_view.rotation;
        assert!(!close(a, b));
    }

    #[test]
    fn device_then_pan_in_one_frame() {
        let mut node = node();
        let feed = SensorFeed::new();
        node.set_device_orientation_provider(Some(Box::new(feed.provider())));
        let device = Quat::from_rotation_x(0.5);
        feed.push(Orientation::new(device, t(0.0)));
        node.pan().apply_pan_delta(0.2, 0.0);

        let mut coordinator = FrameUpdateCoordinator::default();
        let frame = coordinator.update(&mut node, t(0.0));
        assert!(close(
            frame.point_of_view.rotation,
            device * Quat::from_rotation_y(0.2)
        ));
    }

    #[test]
    fn late_sensor_blocks_within_bound_then_hard_cuts() {
        let mut node = node();
        let feed = SensorFeed::new();
        node.set_device_orientation_provider(Some(Box::new(feed.provider())));
        let mut coordinator = FrameUpdateCoordinator::default();

        let q = Quat::from_rotation_y(0.8);
        let writer = feed.clone();
        let sensor = thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            writer.push(Orientation::new(q, t(0.1)));
        });

        let started = Instant::now();
        let first = coordinator.update(&mut node, t(0.0));
        let blocked = started.elapsed();
        assert!(blocked >= Duration::from_millis(40), "returned early: {blocked:?}");
        assert!(blocked < Duration::from_millis(95), "blocked too long: {blocked:?}");
        assert!(first.info.waited_for_sensor);
        assert_eq!(first.point_of_view.rotation, Quat::IDENTITY);

        sensor.join().unwrap();
        let second = coordinator.update(&mut node, t(0.1));
        assert!(close(second.point_of_view.rotation, q));
    }

    #[test]
    fn stale_sample_after_timeout_keeps_next_fresh_sample_a_hard_cut() {
        let mut node = node();
        let feed = SensorFeed::new();
        node.set_device_orientation_provider(Some(Box::new(
            feed.provider().with_max_sample_age(Duration::from_millis(10)),
        )));
        let mut coordinator = FrameUpdateCoordinator::default();

        let old = Quat::from_rotation_y(0.2);
        feed.push(Orientation::new(old, t(0.0)));
        let _ = coordinator.update(&mut node, t(0.0));

        // Sample is too old at 0.1s: the wait times out and the stale sample
        // is re-applied.
        let timed_out = coordinator.update(&mut node, t(0.1));
        assert!(timed_out.info.waited_for_sensor);
        assert!(close(timed_out.point_of_view.rotation, old));

        let fresh = Quat::from_rotation_y(0.9);
        feed.push(Orientation::new(fresh, t(0.2)));
        let frame = coordinator.update(&mut node, t(0.2));
        assert!(!frame.info.waited_for_sensor);
        assert!(close(frame.point_of_view.rotation, fresh));
    }

    #[test]
    fn steady_sensor_updates_are_eased() {
        let mut node = node();
        let feed = SensorFeed::new();
        node.set_device_orientation_provider(Some(Box::new(feed.provider())));
        let mut coordinator = FrameUpdateCoordinator::default();

        feed.push(Orientation::new(Quat::IDENTITY, t(0.0)));
        let _ = coordinator.update(&mut node, t(0.0));
        feed.push(Orientation::new(Quat::from_rotation_y(0.3), t(0.016)));
        let eased = coordinator.update(&mut node, t(0.016));
        assert!(close(eased.point_of_view.rotation, Quat::IDENTITY));
        assert!(!eased.info.waited_for_sensor);
        assert!(node.is_animating(t(0.05)));
    }

    struct GarbageProvider;

    impl DeviceOrientationProvider for GarbageProvider {
        fn should_wait(&self, _time: FrameTime) -> bool {
            false
        }

        fn wait(&self, _time: FrameTime, _timeout: Duration) -> bool {
            true
        }

        fn current_orientation(&self, time: FrameTime) -> Option<Orientation> {
            Some(Orientation {
                rotation: Quat::from_xyzw(f32::NAN, 0.0, 0.0, 0.0),
                timestamp: time,
            })
        }
    }

    #[test]
    fn unusable_samples_keep_the_previous_pose() {
        let mut node = node();
        node.pan().apply_pan_delta(0.4, 0.0);
        let mut coordinator = FrameUpdateCoordinator::default();
        let before = coordinator.update(&mut node, t(0.0));
        node.set_device_orientation_provider(Some(Box::new(GarbageProvider)));
        let after = coordinator.update(&mut node, t(0.1));
        assert!(after.point_of_view.is_valid());
        assert!(close(after.point_of_view.rotation, before.point_of_view.rotation));
    }

    #[derive(Default)]
    struct Recorder {
        calls: Arc<Mutex<Vec<(&'static str, u64, FrameTime)>>>,
    }

    impl RendererHooks for Recorder {
        fn update_at_time(&mut self, info: &FrameInfo) {
            self.calls.lock().unwrap().push(("update", info.frame_index, info.time));
        }

        fn did_apply_animations(&mut self, info: &FrameInfo) {
            self.calls.lock().unwrap().push(("animations", info.frame_index, info.time));
        }

        fn will_render(&mut self, info: &FrameInfo, _pov: &PointOfView) {
            self.calls.lock().unwrap().push(("will_render", info.frame_index, info.time));
        }

        fn did_render(&mut self, info: &FrameInfo) {
            self.calls.lock().unwrap().push(("did_render", info.frame_index, info.time));
        }
    }

    #[test]
    fn hooks_see_identical_frame_timing() {
        let recorder = Recorder::default();
        let calls = Arc::clone(&recorder.calls);
        let mut node = node();
        let mut coordinator = FrameUpdateCoordinator::default();
        coordinator.set_hooks(Some(Box::new(recorder)));

        let _ = coordinator.update(&mut node, t(1.5));
        coordinator.notify_will_render();
        coordinator.notify_did_render();

        let calls = calls.lock().unwrap();
        let names: Vec<_> = calls.iter().map(|c| c.0).collect();
        assert_eq!(names, ["animations", "update", "will_render", "did_render"]);
        assert!(calls.iter().all(|c| c.1 == 0 && c.2 == t(1.5)));
    }

    #[test]
    fn observer_sees_only_committed_frames() {
        let mut node = node();
        let mut coordinator = FrameUpdateCoordinator::default();
        let mut observer = coordinator.take_observer().unwrap();
        assert!(coordinator.take_observer().is_none());
        assert!(observer.latest().is_none());

        node.pan().apply_pan_delta(0.1, 0.0);
        let committed = coordinator.update(&mut node, t(0.0));
        let seen = thread::spawn(move || observer.latest()).join().unwrap();
        assert_eq!(seen, Some(committed));
    }

    #[test]
    fn hold_republishes_previous_pose() {
        let mut node = node();
        let mut coordinator = FrameUpdateCoordinator::default();
        node.pan().apply_pan_delta(0.25, 0.0);
        let live = coordinator.update(&mut node, t(0.0));
        node.pan().apply_pan_delta(0.25, 0.0);
        let held = coordinator.hold(&node, t(1.0));
        assert_eq!(held.point_of_view, live.point_of_view);
        assert_eq!(held.info.frame_index, 1);
        assert_eq!(held.info.time, t(1.0));
    }
}
