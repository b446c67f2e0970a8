use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::PanoError;
use crate::gesture::PanSettings;
use crate::rotation::range::{infinity, is_infinity, is_neg_infinity, neg_infinity};
use crate::rotation::{RotationClamp, RotationRange};
use crate::util::EasingFunction;

/// Closed angle interval in degrees, as written in option files.
///
/// An omitted bound is unbounded. TOML also accepts `inf` / `-inf`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(inline)]
pub struct AngleRange {
    /// Lower bound in degrees.
    #[serde(default = "neg_infinity", skip_serializing_if = "is_neg_infinity")]
    pub min: f32,
    /// Upper bound in degrees.
    #[serde(default = "infinity", skip_serializing_if = "is_infinity")]
    pub max: f32,
}

impl AngleRange {
    /// Interval that never clamps.
    pub const UNCLAMPED: AngleRange = AngleRange {
        min: f32::NEG_INFINITY,
        max: f32::INFINITY,
    };

    /// Interval from `min` to `max` degrees.
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Validated radian range.
    pub fn to_range(self) -> Result<RotationRange, PanoError> {
        RotationRange::from_degrees(self.min, self.max)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Rotation", inline)]
#[serde(default)]
/// Pan limits and gesture feel.
pub struct RotationOptions {
    /// Yaw limits in degrees. Unclamped by default.
    #[schemars(title = "Horizontal Range")]
    pub horizontal: AngleRange,
    /// Pitch limits in degrees.
    #[schemars(title = "Vertical Range")]
    pub vertical: AngleRange,
    /// Whether vertical drags change pitch.
    #[schemars(title = "Vertical Panning")]
    pub vertical_enabled: bool,
    /// Drag multiplier; 1.0 keeps content under the finger.
    #[schemars(title = "Pan Sensitivity", range(min = 0.1, max = 3.0), extend("step" = 0.05))]
    pub pan_sensitivity: f32,
    /// Fling deceleration time in seconds.
    #[schemars(title = "Inertia Duration", range(min = 0.0, max = 3.0), extend("step" = 0.05))]
    pub inertia_duration: f64,
    /// Animated reset length in seconds.
    #[schemars(title = "Reset Duration", range(min = 0.0, max = 2.0), extend("step" = 0.05))]
    pub reset_duration: f64,
    /// Curve used by animated resets.
    #[schemars(skip)]
    pub reset_easing: EasingFunction,
}

impl Default for RotationOptions {
    fn default() -> Self {
        let pan = PanSettings::default();
        Self {
            horizontal: AngleRange::UNCLAMPED,
            vertical: AngleRange::new(-60.0, 60.0),
            vertical_enabled: true,
            pan_sensitivity: 1.0,
            inertia_duration: pan.inertia_duration,
            reset_duration: pan.reset_duration,
            reset_easing: pan.reset_easing,
        }
    }
}

impl RotationOptions {
    /// Clamp described by the horizontal and vertical ranges.
    pub fn clamp(&self) -> Result<RotationClamp, PanoError> {
        Ok(RotationClamp {
            horizontal: self.horizontal.to_range()?,
            vertical: self.vertical.to_range()?,
        })
    }

    /// Controller settings for these options.
    pub fn pan_settings(&self) -> Result<PanSettings, PanoError> {
        if !self.pan_sensitivity.is_finite() || self.pan_sensitivity <= 0.0 {
            return Err(PanoError::invalid(format!(
                "pan sensitivity must be positive, got {}",
                self.pan_sensitivity
            )));
        }
        let settings = PanSettings {
            clamp: self.clamp()?,
            vertical_enabled: self.vertical_enabled,
            inertia_duration: self.inertia_duration,
            reset_duration: self.reset_duration,
            reset_easing: self.reset_easing,
        };
        settings.validate()?;
        Ok(settings)
    }
}
