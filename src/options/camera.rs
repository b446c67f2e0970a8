use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Camera", inline)]
#[serde(default)]
/// Projection and stereo rig parameters.
pub struct CameraOptions {
    /// Vertical field of view in degrees.
    #[schemars(title = "Field of View", range(min = 20.0, max = 120.0), extend("step" = 1.0))]
    pub fov: f32,
    /// Distance between the stereo eyes in scene units.
    #[schemars(title = "Eye Separation", range(min = 0.0, max = 0.2), extend("step" = 0.001))]
    pub eye_separation: f32,
    /// Whether resetting the view also re-centres the device heading.
    #[schemars(title = "Recenter Heading on Reset")]
    pub recenter_heading_on_reset: bool,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            fov: 60.0,
            eye_separation: 0.064,
            recenter_heading_on_reset: true,
        }
    }
}
