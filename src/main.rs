//! Headless panoview demo.
//!
//! Simulates a sensor thread and a gesture thread feeding one panorama view
//! for a few seconds and logs the committed poses. Pass an options TOML path
//! as the only argument to override the defaults.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use glam::{Quat, Vec2, Vec3};
use panoview::engine::{FrameInfo, RendererHooks};
use panoview::gesture::{PanEvent, PanGestureAdapter, PanHandle};
use panoview::interface::{InterfaceOrientation, ManualHostDisplay};
use panoview::node::PointOfView;
use panoview::sensor::{Orientation, SensorFeed};
use panoview::util::FrameClock;
use panoview::{Options, PanoError, PanoramaView};

/// Demo length at the nominal 60 Hz frame rate.
const FRAMES: u32 = 240;
const FRAME_INTERVAL: Duration = Duration::from_micros(16_667);
const SENSOR_INTERVAL: Duration = Duration::from_millis(10);
const VIEWPORT_HEIGHT: f32 = 800.0;

/// Logs a pose summary every second of frames.
struct PoseLogger;

impl RendererHooks for PoseLogger {
    fn will_render(&mut self, info: &FrameInfo, point_of_view: &PointOfView) {
        if info.frame_index % 60 != 0 {
            return;
        }
        let forward = point_of_view.forward();
        let yaw = (-forward.x).atan2(-forward.z).to_degrees();
        let pitch = forward.y.clamp(-1.0, 1.0).asin().to_degrees();
        log::info!(
            "frame {:>4} t={:.3}s yaw={yaw:>7.2}° pitch={pitch:>6.2}°{}",
            info.frame_index,
            info.time.as_secs(),
            if info.waited_for_sensor { " (waited for sensor)" } else { "" }
        );
    }
}

fn load_options(arg: Option<String>) -> Result<Options, PanoError> {
    match arg {
        Some(path) => Options::load(Path::new(&path)),
        None => Ok(Options::default()),
    }
}

/// Slow heading sweep with a little wobble, as a handheld device would
/// report.
fn spawn_sensor(
    feed: SensorFeed,
    clock: FrameClock,
    running: Arc<AtomicBool>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        // Warm-up: the first frames have to wait for a sample.
        thread::sleep(Duration::from_millis(30));
        while running.load(Ordering::Relaxed) {
            let time = clock.now();
            let secs = time.as_secs() as f32;
            let rotation = Quat::from_rotation_y(0.4 * secs)
                * Quat::from_axis_angle(Vec3::X, 0.05 * (3.0 * secs).sin());
            feed.push(Orientation::new(rotation, time));
            thread::sleep(SENSOR_INTERVAL);
        }
    })
}

/// A right-to-left swipe, a fling, then a tap that stops it.
fn spawn_gestures(
    pan: PanHandle,
    adapter: PanGestureAdapter,
    clock: FrameClock,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(500));
        pan.handle_event(&adapter, PanEvent::Began { time: clock.now() });
        for _ in 0..20 {
            pan.handle_event(
                &adapter,
                PanEvent::Changed {
                    delta: Vec2::new(-12.0, 2.0),
                    time: clock.now(),
                },
            );
            thread::sleep(FRAME_INTERVAL);
        }
        pan.handle_event(
            &adapter,
            PanEvent::Ended {
                velocity: Vec2::new(-900.0, 0.0),
                time: clock.now(),
            },
        );
        thread::sleep(Duration::from_millis(400));
        pan.handle_event(&adapter, PanEvent::Began { time: clock.now() });
        pan.handle_event(&adapter, PanEvent::Cancelled { time: clock.now() });
    })
}

fn run(options: &Options) -> Result<(), PanoError> {
    let host = Arc::new(ManualHostDisplay::new(InterfaceOrientation::Portrait));
    let mut view = PanoramaView::new(options, host.clone())?;
    view.set_render_hooks(Some(Box::new(PoseLogger)));
    view.will_move_to_window(true);

    let mut observer = view.take_pose_observer();
    let clock = FrameClock::new();
    let running = Arc::new(AtomicBool::new(true));
    let sensor = spawn_sensor(view.sensor_feed(), clock.clone(), Arc::clone(&running));
    let gestures = spawn_gestures(
        view.pan_handle(),
        view.gesture_adapter(VIEWPORT_HEIGHT),
        clock.clone(),
    );

    let mut clock = clock;
    for frame in 0..FRAMES {
        match frame {
            150 => host.set_orientation(InterfaceOrientation::LandscapeLeft),
            200 => view.set_needs_reset_rotation(true),
            _ => {}
        }
        let time = clock.tick();
        let _ = view.render_frame(time);
        let coordinator = view.coordinator_mut();
        coordinator.notify_did_simulate_physics();
        coordinator.notify_will_render();
        coordinator.notify_did_render();
        thread::sleep(FRAME_INTERVAL);
    }

    running.store(false, Ordering::Relaxed);
    let _ = sensor.join();
    let _ = gestures.join();
    view.will_move_to_window(false);

    if let Some(frame) = observer.as_mut().and_then(|o| o.latest()) {
        log::info!(
            "Final pose after {} frames: {:?} ({:.1} fps)",
            frame.info.frame_index + 1,
            frame.point_of_view.rotation,
            clock.fps()
        );
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let options = match load_options(std::env::args().nth(1)) {
        Ok(options) => options,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&options) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
