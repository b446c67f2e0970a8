use std::ops::BitOr;

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Category bitset selecting which cameras render a piece of geometry.
///
/// Geometry tagged [`LEFT_EYE`](Self::LEFT_EYE) is only seen by cameras
/// whose mask includes that bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EyeMask(u32);

impl EyeMask {
    /// No categories.
    pub const NONE: EyeMask = EyeMask(0);
    /// Every category.
    pub const ALL: EyeMask = EyeMask(u32::MAX);
    /// Geometry for the left eye only.
    pub const LEFT_EYE: EyeMask = EyeMask(1 << 21);
    /// Geometry for the right eye only.
    pub const RIGHT_EYE: EyeMask = EyeMask(1 << 22);
    /// Mask of a single (non-stereo) camera: everything except right-eye
    /// geometry, so stereo content shows its left half.
    pub const MONO: EyeMask = EyeMask::ALL.difference(EyeMask::RIGHT_EYE);

    /// Mask from raw bits.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw bits.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Bits set in `self` but not in `other`.
    #[must_use]
    pub const fn difference(self, other: EyeMask) -> Self {
        Self(self.0 & !other.0)
    }

    /// Whether every bit of `other` is set.
    pub const fn contains(self, other: EyeMask) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether a camera with this mask renders geometry in `category`.
    pub const fn intersects(self, category: EyeMask) -> bool {
        self.0 & category.0 != 0
    }
}

impl Default for EyeMask {
    fn default() -> Self {
        Self::MONO
    }
}

impl BitOr for EyeMask {
    type Output = EyeMask;

    fn bitor(self, rhs: EyeMask) -> EyeMask {
        EyeMask(self.0 | rhs.0)
    }
}

/// One side of a stereo rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Eye {
    /// Left eye, offset toward -X.
    Left,
    /// Right eye, offset toward +X.
    Right,
}

impl Eye {
    /// Camera mask for this eye: hides the other eye's geometry.
    pub const fn mask(self) -> EyeMask {
        match self {
            Eye::Left => EyeMask::ALL.difference(EyeMask::RIGHT_EYE),
            Eye::Right => EyeMask::ALL.difference(EyeMask::LEFT_EYE),
        }
    }

    const fn side(self) -> f32 {
        match self {
            Eye::Left => -1.0,
            Eye::Right => 1.0,
        }
    }
}

/// Per-eye sub-camera handed to a stereo renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeCamera {
    /// Which eye.
    pub eye: Eye,
    /// Shared head orientation.
    pub rotation: Quat,
    /// Eye position relative to the head, in meters.
    pub offset: Vec3,
    /// Vertical field of view in degrees.
    pub field_of_view: f32,
    /// Categories this camera renders.
    pub eye_mask: EyeMask,
}

impl EyeCamera {
    /// Camera for `eye` with the two eyes `separation` meters apart.
    pub fn new(eye: Eye, rotation: Quat, separation: f32, field_of_view: f32) -> Self {
        let right = rotation * Vec3::X;
        Self {
            eye,
            rotation,
            offset: right * (eye.side() * separation * 0.5),
            field_of_view,
            eye_mask: eye.mask(),
        }
    }

    /// View matrix (inverse of the eye's world transform).
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_quat(self.rotation.conjugate()) * Mat4::from_translation(-self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_mask_hides_right_eye_only() {
        assert!(EyeMask::MONO.intersects(EyeMask::LEFT_EYE));
        assert!(!EyeMask::MONO.intersects(EyeMask::RIGHT_EYE));
        assert!(EyeMask::MONO.contains(EyeMask::from_bits(1)));
    }

    #[test]
    fn eye_masks_are_exclusive() {
        assert!(Eye::Left.mask().intersects(EyeMask::LEFT_EYE));
        assert!(!Eye::Left.mask().intersects(EyeMask::RIGHT_EYE));
        assert!(Eye::Right.mask().intersects(EyeMask::RIGHT_EYE));
        assert!(!Eye::Right.mask().intersects(EyeMask::LEFT_EYE));
    }

    #[test]
    fn eyes_are_offset_along_camera_right() {
        let rotation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let left = EyeCamera::new(Eye::Left, rotation, 0.064, 90.0);
        let right = EyeCamera::new(Eye::Right, rotation, 0.064, 90.0);
        // Camera right after a 90° left turn points along -Z.
        assert!((right.offset - Vec3::new(0.0, 0.0, -0.032)).length() < 1e-6);
        assert!((left.offset + right.offset).length() < 1e-6);
    }

    #[test]
    fn mask_serializes_as_plain_bits() {
        let json = serde_json::to_string(&(EyeMask::LEFT_EYE | EyeMask::RIGHT_EYE)).unwrap();
        assert_eq!(json, ((1u32 << 21) | (1u32 << 22)).to_string());
    }
}
