use glam::{DMat3, DQuat, DVec3};

use crate::error::AbsOrientError;

/// Maximum deviation of the quaternion norm from one that is accepted as unit.
const UNIT_NORM_TOLERANCE: f64 = 1e-6;

/// Rotation matrix of the quaternion (w, x, y, z) in homogeneous form.
///
/// For a non-unit quaternion the result is the rotation scaled by |q|^2.
pub(crate) fn quat_to_mat3(w: f64, x: f64, y: f64, z: f64) -> DMat3 {
    let (ww, xx, yy, zz) = (w * w, x * x, y * y, z * z);
    let (wx, wy, wz) = (w * x, w * y, w * z);
    let (xy, xz, yz) = (x * y, x * z, y * z);

    DMat3::from_cols(
        DVec3::new(ww + xx - yy - zz, 2.0 * (xy + wz), 2.0 * (xz - wy)),
        DVec3::new(2.0 * (xy - wz), ww - xx + yy - zz, 2.0 * (yz + wx)),
        DVec3::new(2.0 * (xz + wy), 2.0 * (yz - wx), ww - xx - yy + zz),
    )
}

/// Compute the rotation matrix corresponding to a unit quaternion.
///
/// # Arguments
///
/// * `q` - The quaternion coefficients as `(q0, qx, qy, qz)`, scalar first.
///
/// # Returns
///
/// The 3x3 rotation matrix representing the same rotation.
///
/// PRECONDITION: `q` has unit norm. Quaternions whose norm deviates from one by more
/// than `1e-6` are rejected with [`AbsOrientError::NonUnitQuaternion`]; normalize them
/// first.
///
/// Example:
///
/// ```
/// use kornia_absorient::quaternion_to_matrix;
///
/// let r = quaternion_to_matrix(&[1.0, 0.0, 0.0, 0.0]).unwrap();
/// assert_eq!(r, glam::DMat3::IDENTITY);
/// ```
pub fn quaternion_to_matrix(q: &[f64; 4]) -> Result<DMat3, AbsOrientError> {
    let norm = q.iter().map(|c| c * c).sum::<f64>().sqrt();
    if norm.is_nan() || (norm - 1.0).abs() > UNIT_NORM_TOLERANCE {
        return Err(AbsOrientError::NonUnitQuaternion(norm));
    }
    Ok(quat_to_mat3(q[0], q[1], q[2], q[3]))
}

/// Compute the unit quaternion `(q0, qx, qy, qz)` of a rotation matrix.
///
/// The sign is chosen so that `q0 >= 0`.
///
/// PRECONDITION: `mat` is orthonormal with determinant +1.
pub fn matrix_to_quaternion(mat: &DMat3) -> [f64; 4] {
    let mut q = DQuat::from_mat3(mat).normalize();
    if q.w < 0.0 {
        q = -q;
    }
    [q.w, q.x, q.y, q.z]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn test_identity_quaternion() -> Result<(), AbsOrientError> {
        let r = quaternion_to_matrix(&[1.0, 0.0, 0.0, 0.0])?;
        assert_eq!(r, DMat3::IDENTITY);
        Ok(())
    }

    #[test]
    fn test_quarter_turn_about_z() -> Result<(), AbsOrientError> {
        let h = std::f64::consts::FRAC_1_SQRT_2;
        let r = quaternion_to_matrix(&[h, 0.0, 0.0, h])?;
        let expected = DMat3::from_cols(DVec3::Y, -DVec3::X, DVec3::Z);
        assert!(r.abs_diff_eq(expected, 1e-15));
        Ok(())
    }

    #[test]
    fn test_random_unit_quaternions() -> Result<(), AbsOrientError> {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let raw = DQuat::from_xyzw(
                rng.random_range(-1.0..1.0),
                rng.random_range(-1.0..1.0),
                rng.random_range(-1.0..1.0),
                rng.random_range(-1.0..1.0),
            );
            let q = raw.normalize();
            let r = quaternion_to_matrix(&[q.w, q.x, q.y, q.z])?;
            let expected = DMat3::from_quat(q);
            assert!(r.abs_diff_eq(expected, 1e-9), "{r:?} != {expected:?}");
            assert_relative_eq!(r.determinant(), 1.0, epsilon = 1e-9);
        }
        Ok(())
    }

    #[test]
    fn test_negated_quaternion_same_matrix() -> Result<(), AbsOrientError> {
        let q = [0.5, -0.5, 0.5, 0.5];
        let neg = [-0.5, 0.5, -0.5, -0.5];
        assert_eq!(quaternion_to_matrix(&q)?, quaternion_to_matrix(&neg)?);
        Ok(())
    }

    #[test]
    fn test_non_unit_quaternion() {
        let res = quaternion_to_matrix(&[2.0, 0.0, 0.0, 0.0]);
        assert!(matches!(res, Err(AbsOrientError::NonUnitQuaternion(n)) if n == 2.0));
        assert!(matches!(
            quaternion_to_matrix(&[f64::NAN, 0.0, 0.0, 0.0]),
            Err(AbsOrientError::NonUnitQuaternion(_))
        ));
    }

    #[test]
    fn test_scaled_rotation() {
        // the unchecked expansion scales the rotation by |q|^2
        let r = quat_to_mat3(2.0, 0.0, 0.0, 0.0);
        assert_eq!(r, DMat3::from_diagonal(DVec3::splat(4.0)));
    }

    #[test]
    fn test_matrix_to_quaternion() -> Result<(), AbsOrientError> {
        let q = DQuat::from_xyzw(0.1, -0.7, 0.3, -0.6).normalize();
        let m = DMat3::from_quat(q);
        let back = matrix_to_quaternion(&m);
        // sign flipped so that the scalar part is positive
        assert!(back[0] >= 0.0);
        assert_relative_eq!(back[0], -q.w, epsilon = 1e-12);
        assert_relative_eq!(back[1], -q.x, epsilon = 1e-12);
        assert_relative_eq!(back[2], -q.y, epsilon = 1e-12);
        assert_relative_eq!(back[3], -q.z, epsilon = 1e-12);
        assert!(quaternion_to_matrix(&back)?.abs_diff_eq(m, 1e-12));
        Ok(())
    }
}
