//! Similarity transform between frame and reference coordinates.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Uniform scale, rotation and translation.
///
/// A frame's transform maps that frame's pixel coordinates into reference
/// coordinates:
/// `x' = s(x cos θ - y sin θ) + tx`, `y' = s(x sin θ + y cos θ) + ty`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineTransform {
    pub scale: f64,
    /// Rotation in radians, counter-clockwise in image coordinates.
    pub rotation: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl AffineTransform {
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        rotation: 0.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub fn new(scale: f64, rotation: f64, tx: f64, ty: f64) -> Self {
        debug_assert!(scale > 0.0, "scale must be positive, got {scale}");
        Self {
            scale,
            rotation,
            tx,
            ty,
        }
    }

    pub fn translation(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, tx, ty)
    }

    #[inline]
    pub fn translation_components(&self) -> DVec2 {
        DVec2::new(self.tx, self.ty)
    }

    /// Frame coordinates to reference coordinates.
    #[inline]
    pub fn apply(&self, p: DVec2) -> DVec2 {
        let (sin, cos) = self.rotation.sin_cos();
        DVec2::new(
            self.scale * (p.x * cos - p.y * sin) + self.tx,
            self.scale * (p.x * sin + p.y * cos) + self.ty,
        )
    }

    /// Reference coordinates back to frame coordinates.
    #[inline]
    pub fn apply_inverse(&self, p: DVec2) -> DVec2 {
        let (sin, cos) = self.rotation.sin_cos();
        let x = p.x - self.tx;
        let y = p.y - self.ty;
        DVec2::new(
            (x * cos + y * sin) / self.scale,
            (-x * sin + y * cos) / self.scale,
        )
    }

    pub fn inverse(&self) -> Self {
        let scale = 1.0 / self.scale;
        let rotation = -self.rotation;
        let (sin, cos) = rotation.sin_cos();
        Self {
            scale,
            rotation,
            tx: -scale * (self.tx * cos - self.ty * sin),
            ty: -scale * (self.tx * sin + self.ty * cos),
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Distance between where this transform and `other` send `p`.
    pub fn distance_at(&self, other: &AffineTransform, p: DVec2) -> f64 {
        self.apply(p).distance(other.apply(p))
    }
}

impl std::fmt::Display for AffineTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Similarity(dx={:.2}, dy={:.2}, rot={:.3}°, scale={:.4})",
            self.tx,
            self.ty,
            self.rotation.to_degrees(),
            self.scale
        )
    }
}
