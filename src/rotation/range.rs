use serde::{Deserialize, Serialize};

use crate::error::PanoError;

/// Closed angular interval `[min, max]` in radians for one rotation axis.
///
/// Construction rejects `min > max` and NaN bounds; an unbounded axis uses
/// `(-∞, +∞)`. Deserialization goes through the same check. Infinite bounds
/// are omitted when serialized, since JSON has no infinity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRange", into = "RawRange")]
pub struct RotationRange {
    min: f32,
    max: f32,
}

#[derive(Serialize, Deserialize)]
struct RawRange {
    #[serde(default = "neg_infinity", skip_serializing_if = "is_neg_infinity")]
    min: f32,
    #[serde(default = "infinity", skip_serializing_if = "is_infinity")]
    max: f32,
}

pub(crate) fn neg_infinity() -> f32 {
    f32::NEG_INFINITY
}

pub(crate) fn infinity() -> f32 {
    f32::INFINITY
}

pub(crate) fn is_neg_infinity(v: &f32) -> bool {
    *v == f32::NEG_INFINITY
}

pub(crate) fn is_infinity(v: &f32) -> bool {
    *v == f32::INFINITY
}

impl RotationRange {
    /// Range that never clamps.
    pub const UNCLAMPED: RotationRange = RotationRange {
        min: f32::NEG_INFINITY,
        max: f32::INFINITY,
    };

    /// Range from radian bounds.
    pub fn new(min: f32, max: f32) -> Result<Self, PanoError> {
        if min.is_nan() || max.is_nan() {
            return Err(PanoError::invalid(format!(
                "rotation range bounds must not be NaN (min={min}, max={max})"
            )));
        }
        if min == f32::INFINITY || max == f32::NEG_INFINITY {
            return Err(PanoError::invalid(format!(
                "rotation range is empty (min={min}, max={max})"
            )));
        }
        if min > max {
            return Err(PanoError::invalid(format!(
                "rotation range min {min} exceeds max {max}"
            )));
        }
        Ok(Self { min, max })
    }

    /// Range from degree bounds.
    pub fn from_degrees(min: f32, max: f32) -> Result<Self, PanoError> {
        Self::new(min.to_radians(), max.to_radians())
    }

    /// Lower bound in radians.
    pub fn min(&self) -> f32 {
        self.min
    }

    /// Upper bound in radians.
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Whether both bounds are infinite.
    pub fn is_unclamped(&self) -> bool {
        self.min == f32::NEG_INFINITY && self.max == f32::INFINITY
    }

    /// Clamp `angle` into the range.
    #[inline]
    pub fn clamp(&self, angle: f32) -> f32 {
        angle.clamp(self.min, self.max)
    }

    /// Whether `angle` lies inside the range.
    pub fn contains(&self, angle: f32) -> bool {
        (self.min..=self.max).contains(&angle)
    }
}

impl Default for RotationRange {
    fn default() -> Self {
        Self::UNCLAMPED
    }
}

impl TryFrom<RawRange> for RotationRange {
    type Error = PanoError;

    fn try_from(raw: RawRange) -> Result<Self, Self::Error> {
        Self::new(raw.min, raw.max)
    }
}

impl From<RotationRange> for RawRange {
    fn from(range: RotationRange) -> Self {
        Self {
            min: range.min,
            max: range.max,
        }
    }
}

/// Per-axis bounds applied to the user's pan rotation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RotationClamp {
    /// Bounds for yaw (rotation about the vertical axis).
    pub horizontal: RotationRange,
    /// Bounds for pitch (rotation about the camera's right axis).
    pub vertical: RotationRange,
}

impl RotationClamp {
    /// Clamp a yaw/pitch pair to both ranges.
    #[inline]
    pub fn apply(&self, yaw: f32, pitch: f32) -> (f32, f32) {
        (self.horizontal.clamp(yaw), self.vertical.clamp(pitch))
    }

    #[inline]
    pub(crate) fn apply_offset(&self, (yaw, pitch): (f32, f32)) -> (f32, f32) {
        self.apply(yaw, pitch)
    }

    /// Whether a yaw/pitch pair already satisfies both ranges.
    pub fn contains(&self, yaw: f32, pitch: f32) -> bool {
        self.horizontal.contains(yaw) && self.vertical.contains(pitch)
    }
}
