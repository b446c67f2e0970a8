use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use web_time::Duration;

use crate::engine::{CoordinatorSettings, DEFAULT_ANIMATION_DURATION};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Frame", inline)]
#[serde(default)]
/// Per-frame update behavior.
pub struct FrameOptions {
    /// Implicit animation length for sensor updates, in seconds.
    #[schemars(title = "Sensor Smoothing", range(min = 0.0, max = 0.5), extend("step" = 0.005))]
    pub default_animation_duration: f64,
    /// Longest a frame blocks for a late sensor sample, in milliseconds.
    #[schemars(title = "Max Sensor Wait", range(min = 0, max = 200))]
    pub max_sensor_wait_ms: u64,
    /// Whether the device attitude drives the view.
    #[schemars(title = "Device Orientation Tracking")]
    pub device_orientation_tracking: bool,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            default_animation_duration: DEFAULT_ANIMATION_DURATION,
            max_sensor_wait_ms: 50,
            device_orientation_tracking: true,
        }
    }
}

impl FrameOptions {
    /// Coordinator settings for these options.
    pub fn coordinator_settings(&self) -> CoordinatorSettings {
        CoordinatorSettings {
            default_animation_duration: self.default_animation_duration,
            max_sensor_wait: Duration::from_millis(self.max_sensor_wait_ms),
        }
    }
}
