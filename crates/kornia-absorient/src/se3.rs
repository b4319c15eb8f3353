use glam::{DMat4, DVec3, DVec4};

use crate::so3::SO3F64;

/// A rigid body transformation `p' = R * p + t`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SE3F64 {
    /// Rotation part.
    pub rotation: SO3F64,
    /// Translation part.
    pub translation: DVec3,
}

impl SE3F64 {
    /// The identity transformation.
    pub const IDENTITY: Self = Self {
        rotation: SO3F64::IDENTITY,
        translation: DVec3::ZERO,
    };

    /// Create a new rigid transformation.
    pub fn new(rotation: SO3F64, translation: DVec3) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Apply the transformation to a point.
    #[inline]
    pub fn transform_point(&self, p: DVec3) -> DVec3 {
        self.rotation * p + self.translation
    }

    /// The inverse transformation.
    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.inverse();
        Self {
            rotation,
            translation: -(rotation * self.translation),
        }
    }

    /// The 4x4 homogeneous matrix.
    pub fn matrix(&self) -> DMat4 {
        let r = self.rotation.matrix();
        DMat4::from_cols(
            r.x_axis.extend(0.0),
            r.y_axis.extend(0.0),
            r.z_axis.extend(0.0),
            DVec4::new(self.translation.x, self.translation.y, self.translation.z, 1.0),
        )
    }
}

impl Default for SE3F64 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl std::ops::Mul<SE3F64> for SE3F64 {
    type Output = SE3F64;

    fn mul(self, rhs: Self) -> Self::Output {
        Self {
            rotation: self.rotation * rhs.rotation,
            translation: self.translation + self.rotation * rhs.translation,
        }
    }
}

impl std::ops::Mul<DVec3> for SE3F64 {
    type Output = DVec3;

    fn mul(self, rhs: DVec3) -> Self::Output {
        self.transform_point(rhs)
    }
}

/// A similarity transformation: a rigid transformation applied after a uniform scale,
/// `p' = R * (s * p) + t`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Similarity {
    /// Rigid part, applied after scaling.
    pub transform: SE3F64,
    /// Uniform scale factor, strictly positive.
    pub scale: f64,
}

impl Similarity {
    /// Apply the similarity to a point.
    #[inline]
    pub fn transform_point(&self, p: DVec3) -> DVec3 {
        self.transform.transform_point(self.scale * p)
    }

    /// The inverse similarity, mapping `R * (s * p) + t` back to `p`.
    pub fn inverse(&self) -> Self {
        let inv = self.transform.inverse();
        let scale = 1.0 / self.scale;
        Self {
            transform: SE3F64::new(inv.rotation, inv.translation * scale),
            scale,
        }
    }
}
