//! Rotation-only alignment of corresponding 3D points and rays.
//!
//! Reference: Shinji Umeyama, "Least-squares estimation of transformation parameters
//! between two point patterns", IEEE PAMI 13(4):376-380, 1991.

use glam::{DMat3, DVec3};

use crate::error::AbsOrientError;
use crate::ops::{check_correspondences, cross_covariance, fit_rotation};
use crate::so3::SO3F64;

/// Relative threshold on |a1 x a2| below which two rays count as parallel.
const PARALLEL_EPSILON: f64 = 1e-12;

/// Compute the rotation between two sets of points maximizing `Σ b_i · (R * a_i)`.
///
/// This is the rotation step of the Umeyama absolute orientation algorithm. The points
/// are used as they are, without removing the centroids, so the result is the rotation
/// about the origin. [`compute_absolute_orientation`](crate::compute_absolute_orientation)
/// and [`compute_similarity`](crate::compute_similarity) use the same step on centered
/// points.
///
/// # Arguments
///
/// * `a` - Source points.
/// * `b` - Target points, `b[i]` corresponds to `a[i]`.
///
/// # Returns
///
/// The proper rotation `R` such that `b ≈ R * a`.
///
/// # Errors
///
/// Fails when the inputs differ in length, hold fewer than two correspondences or
/// non-finite coordinates, or when the points span less than a plane through the origin (e.g. all collinear with it), in
/// which case the rotation is not unique.
///
/// Example:
///
/// ```
/// use glam::DVec3;
/// use kornia_absorient::compute_orientation;
///
/// let a = [DVec3::X, DVec3::Y, DVec3::Z];
/// let b = [DVec3::Y, -DVec3::X, DVec3::Z];
/// let r = compute_orientation(&a, &b).unwrap();
/// assert!((r * DVec3::X).abs_diff_eq(DVec3::Y, 1e-12));
/// ```
pub fn compute_orientation(a: &[DVec3], b: &[DVec3]) -> Result<SO3F64, AbsOrientError> {
    check_correspondences(a, b, 2)?;

    let h = cross_covariance(a, b, DVec3::ZERO, DVec3::ZERO);
    let fit = fit_rotation(&h)?;

    Ok(SO3F64::from_matrix(&fit.rotation))
}

/// Orthonormal frame with the first axis along `v1` and the third along `v1 x v2`.
fn ray_frame(v1: &DVec3, v2: &DVec3) -> Result<DMat3, AbsOrientError> {
    if !v1.is_finite() || !v2.is_finite() {
        return Err(AbsOrientError::NonFiniteInput);
    }

    let len1 = v1.length();
    let len2 = v2.length();
    if len1 <= 0.0 || len2 <= 0.0 {
        return Err(AbsOrientError::ParallelRays);
    }

    let e1 = *v1 / len1;
    let n = e1.cross(*v2 / len2);
    let n_len = n.length();
    if !n_len.is_finite() || n_len <= PARALLEL_EPSILON {
        return Err(AbsOrientError::ParallelRays);
    }

    let e3 = n / n_len;
    let e2 = e3.cross(e1);
    Ok(DMat3::from_cols(e1, e2, e3))
}

/// Compute the rotation between two pairs of corresponding rays.
///
/// Builds an orthonormal frame from `{a1, a1 x a2}` and one from `{b1, b1 x b2}` and
/// returns the rotation mapping the first frame onto the second. This avoids the SVD of
/// [`compute_orientation`] and is several times faster for exactly two correspondences.
///
/// The first pair is matched exactly, `R * a1` points along `b1`; the second pair only
/// fixes the rotation about that axis.
///
/// # Arguments
///
/// * `a1` - First source ray.
/// * `b1` - First target ray.
/// * `a2` - Second source ray.
/// * `b2` - Second target ray.
///
/// # Errors
///
/// Returns [`AbsOrientError::ParallelRays`] if any ray is zero or if `a1` is parallel to
/// `a2` (or `b1` to `b2`), and [`AbsOrientError::NonFiniteInput`] if any ray holds a NaN
/// or infinite coordinate.
pub fn compute_orientation_from_rays(
    a1: &DVec3,
    b1: &DVec3,
    a2: &DVec3,
    b2: &DVec3,
) -> Result<SO3F64, AbsOrientError> {
    let frame_a = ray_frame(a1, a2)?;
    let frame_b = ray_frame(b1, b2)?;

    // both frames are orthonormal, the inverse is the transpose
    let r = frame_b * frame_a.transpose();

    Ok(SO3F64::from_matrix(&r))
}
