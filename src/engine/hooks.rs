use crate::node::PointOfView;
use crate::util::FrameTime;

/// Timing metadata shared by every hook call of one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    /// Frame timestamp passed to the coordinator.
    pub time: FrameTime,
    /// Sequential frame number, starting at zero.
    pub frame_index: u64,
    /// Whether this frame blocked waiting for a sensor sample.
    pub waited_for_sensor: bool,
}

/// Observer callbacks around each frame.
///
/// Hooks receive read-only frame data after composition, so they can follow
/// the render loop but never reorder or alter it. All methods default to
/// doing nothing.
pub trait RendererHooks: Send {
    /// The frame's pose has been committed.
    fn update_at_time(&mut self, _info: &FrameInfo) {}

    /// Implicit animations have been evaluated for the frame.
    fn did_apply_animations(&mut self, _info: &FrameInfo) {}

    /// The host finished its physics step for the frame.
    fn did_simulate_physics(&mut self, _info: &FrameInfo) {}

    /// The host is about to draw the frame from `point_of_view`.
    fn will_render(&mut self, _info: &FrameInfo, _point_of_view: &PointOfView) {}

    /// The host finished drawing the frame.
    fn did_render(&mut self, _info: &FrameInfo) {}
}
