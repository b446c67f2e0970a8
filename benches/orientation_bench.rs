//! Per-frame composition and easing benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::{Quat, Vec2};
use panoview::engine::FrameUpdateCoordinator;
use panoview::gesture::{PanHandle, PanRotationController, PanSettings};
use panoview::node::{NodeSettings, OrientationNode};
use panoview::sensor::{Orientation, SensorFeed};
use panoview::util::{EasingFunction, FrameTime};

fn easing_benchmark(c: &mut Criterion) {
    let f = EasingFunction::DEFAULT;
    c.bench_function("cubic_hermite_easing", |b| {
        b.iter(|| black_box(f.evaluate(black_box(0.5))))
    });
}

fn node() -> OrientationNode {
    let pan = PanHandle::new(
        PanRotationController::new(PanSettings::default()).unwrap(),
    );
    OrientationNode::new(pan, NodeSettings::default()).unwrap()
}

fn composition_benchmark(c: &mut Criterion) {
    let mut node = node();
    let _ = node
        .pan()
        .begin_inertia(Vec2::new(2.0, 0.5), FrameTime::ZERO);
    c.bench_function("compose_point_of_view", |b| {
        b.iter(|| black_box(node.point_of_view(black_box(FrameTime::from_secs(0.25)))))
    });
}

fn frame_update_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_update");

    group.bench_function("pan_only", |b| {
        let mut node = node();
        let mut coordinator = FrameUpdateCoordinator::default();
        let mut frame = 0u32;
        b.iter(|| {
            frame += 1;
            node.pan().apply_pan_delta(0.001, 0.0005);
            black_box(coordinator.update(
                &mut node,
                FrameTime::from_secs(f64::from(frame) / 60.0),
            ))
        });
    });

    group.bench_function("with_sensor", |b| {
        let mut node = node();
        let feed = SensorFeed::new();
        node.set_device_orientation_provider(Some(Box::new(feed.provider())));
        let mut coordinator = FrameUpdateCoordinator::default();
        let mut frame = 0u32;
        b.iter(|| {
            frame += 1;
            let time = FrameTime::from_secs(f64::from(frame) / 60.0);
            feed.push(Orientation::new(
                Quat::from_rotation_y(frame as f32 * 0.01),
                time,
            ));
            black_box(coordinator.update(&mut node, time))
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    easing_benchmark,
    composition_benchmark,
    frame_update_benchmark
);
criterion_main!(benches);
