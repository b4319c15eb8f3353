//! # SO(3) rotations
//!
//! [`SO3F64`] stores a 3D rotation as a unit quaternion. The solvers in this crate
//! produce rotation matrices through SVD and hand them back as `SO3F64`, and the
//! mean orientation solver works in the tangent space through `exp` / `log`.
//!
//! `q` and `-q` represent the same rotation; [`SO3F64::log`] always returns the
//! shortest rotation vector (angle in `[0, π]`).

use glam::{DMat3, DQuat, DVec3};

use crate::quaternion::quat_to_mat3;

const SMALL_ANGLE_EPSILON: f64 = 1.0e-10;

/// A 3D rotation, stored as a unit quaternion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SO3F64 {
    /// Unit quaternion.
    pub q: DQuat,
}

impl SO3F64 {
    /// The identity rotation.
    pub const IDENTITY: Self = Self { q: DQuat::IDENTITY };

    /// Create a new rotation from a quaternion.
    /// NOTE: quaternion should be normalized
    #[inline]
    pub fn from_quaternion(quat: DQuat) -> Self {
        Self { q: quat }
    }

    /// Create a rotation from an orthonormal matrix with determinant +1.
    pub fn from_matrix(mat: &DMat3) -> Self {
        Self {
            q: DQuat::from_mat3(mat).normalize(),
        }
    }

    /// Rotation of `angle` radians about `axis`.
    pub fn from_axis_angle(axis: DVec3, angle: f64) -> Self {
        Self::exp(axis.normalize() * angle)
    }

    /// The 3x3 rotation matrix.
    pub fn matrix(&self) -> DMat3 {
        quat_to_mat3(self.q.w, self.q.x, self.q.y, self.q.z)
    }

    /// The inverse rotation.
    #[inline]
    pub fn inverse(&self) -> Self {
        Self {
            q: self.q.conjugate(),
        }
    }

    /// Rotate a point.
    #[inline]
    pub fn transform_point(&self, p: DVec3) -> DVec3 {
        self.q * p
    }

    /// Lie algebra -> Lie group
    pub fn exp(v: DVec3) -> Self {
        let theta_sq = v.dot(v);
        let theta = theta_sq.sqrt();

        let (w, b) = if theta < SMALL_ANGLE_EPSILON {
            // taylor series of cos(x/2) and sin(x/2)/x around 0
            (1.0 - theta_sq / 8.0, 0.5 - theta_sq / 48.0)
        } else {
            let theta_half = 0.5 * theta;
            (theta_half.cos(), theta_half.sin() / theta)
        };

        let xyz = b * v;
        Self {
            q: DQuat::from_xyzw(xyz.x, xyz.y, xyz.z, w),
        }
    }

    /// Lie group -> Lie algebra
    pub fn log(&self) -> DVec3 {
        let mut w = self.q.w;
        let mut vec = DVec3::new(self.q.x, self.q.y, self.q.z);

        if w < 0.0 {
            w = -w;
            vec = -vec;
        }

        let sin_half = vec.length();
        if sin_half < SMALL_ANGLE_EPSILON {
            vec * (2.0 / w)
        } else {
            // atan2 keeps full precision near the identity where acos does not
            let theta = 2.0 * sin_half.atan2(w);
            vec * (theta / sin_half)
        }
    }

    /// Vector space -> Lie algebra
    pub fn hat(v: DVec3) -> DMat3 {
        DMat3::from_cols_array(&[0.0, v.z, -v.y, -v.z, 0.0, v.x, v.y, -v.x, 0.0])
    }

    /// Lie algebra -> vector space
    pub fn vee(omega: DMat3) -> DVec3 {
        DVec3::new(omega.y_axis.z, omega.z_axis.x, omega.x_axis.y)
    }

    /// Right retraction, `self * exp(tau)`.
    #[inline]
    pub fn rplus(&self, tau: DVec3) -> Self {
        *self * SO3F64::exp(tau)
    }

    /// Right difference, `log(self^-1 * other)`.
    #[inline]
    pub fn rminus(&self, other: &Self) -> DVec3 {
        (self.inverse() * *other).log()
    }

    /// Geodesic distance to `other` in radians.
    pub fn angle_to(&self, other: &Self) -> f64 {
        self.rminus(other).length()
    }
}

impl Default for SO3F64 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl std::ops::Mul<SO3F64> for SO3F64 {
    type Output = SO3F64;

    fn mul(self, rhs: Self) -> Self::Output {
        Self { q: self.q * rhs.q }
    }
}

impl std::ops::MulAssign<SO3F64> for SO3F64 {
    #[inline]
    fn mul_assign(&mut self, rhs: SO3F64) {
        *self = *self * rhs;
    }
}

impl std::ops::Mul<DVec3> for SO3F64 {
    type Output = DVec3;

    fn mul(self, rhs: DVec3) -> Self::Output {
        self.transform_point(rhs)
    }
}
