use glam::Vec2;

use super::controller::{PanHandle, PanRotationController};
use crate::util::FrameTime;

/// Recognized pan gesture events, in viewport points.
///
/// Produced by the host's gesture recognizer; this crate does no hit
/// testing or touch disambiguation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanEvent {
    /// Finger down. Cancels any running fling or reset.
    Began {
        /// Event time.
        time: FrameTime,
    },
    /// Incremental movement since the previous event.
    Changed {
        /// Movement in points; +x right, +y down.
        delta: Vec2,
        /// Event time.
        time: FrameTime,
    },
    /// Finger lifted while moving.
    Ended {
        /// Release velocity in points per second.
        velocity: Vec2,
        /// Event time.
        time: FrameTime,
    },
    /// Gesture cancelled by the host; no fling follows.
    Cancelled {
        /// Event time.
        time: FrameTime,
    },
}

/// Converts point-space pan events into angular controller calls.
///
/// Dragging across the full viewport height turns the view by the vertical
/// field of view, so content tracks the finger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanGestureAdapter {
    radians_per_point: f32,
}

impl PanGestureAdapter {
    /// Adapter for a viewport `viewport_height` points tall showing
    /// `fov_degrees` vertically, scaled by `sensitivity`.
    pub fn new(viewport_height: f32, fov_degrees: f32, sensitivity: f32) -> Self {
        let radians_per_point = if viewport_height > 0.0 {
            fov_degrees.to_radians() / viewport_height * sensitivity
        } else {
            0.0
        };
        Self { radians_per_point }
    }

    /// Angular scale applied to point deltas.
    pub fn radians_per_point(&self) -> f32 {
        self.radians_per_point
    }

    /// Feed one event to a controller.
    pub fn apply(&self, controller: &mut PanRotationController, event: PanEvent) {
        match event {
            PanEvent::Began { time } | PanEvent::Cancelled { time } => {
                let _ = controller.stop_animations(time);
            }
            PanEvent::Changed { delta, time } => {
                let _ = controller.stop_animations(time);
                let d = delta * self.radians_per_point;
                controller.apply_pan_delta(d.x, d.y);
            }
            PanEvent::Ended { velocity, time } => {
                let _ = controller
                    .begin_inertia(velocity * self.radians_per_point, time);
            }
        }
    }
}

impl PanHandle {
    /// Feed one event under a single lock acquisition.
    pub fn handle_event(&self, adapter: &PanGestureAdapter, event: PanEvent) {
        adapter.apply(&mut self.lock(), event);
    }
}
