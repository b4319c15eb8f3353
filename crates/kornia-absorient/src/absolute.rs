//! Rigid and similarity alignment (Umeyama) of corresponding 3D point sets.

use glam::DVec3;

use crate::error::AbsOrientError;
use crate::ops::{check_correspondences, compute_centroid, cross_covariance, fit_rotation};
use crate::se3::{SE3F64, Similarity};
use crate::so3::SO3F64;

/// Spread of the source points, relative to their magnitude, below which they coincide.
const ZERO_VARIANCE_EPSILON: f64 = f64::EPSILON;

/// Compute the rigid transformation between two corresponding point sets.
///
/// The algorithm:
/// 1. Compute the centroids of both point sets
/// 2. Compute the cross-covariance H = Σ[(b_i - b_mean) * (a_i - a_mean)^T]
/// 3. Compute the SVD of H = U * D * V^T
/// 4. Calculate the rotation R = U * S * V^T, S = diag(1, 1, det(U * V^T))
/// 5. Calculate the translation t = b_mean - R * a_mean
///
/// # Arguments
///
/// * `a` - Source points.
/// * `b` - Target points, `b[i]` corresponds to `a[i]`.
///
/// # Returns
///
/// The transformation `T` such that `b[i] ≈ T * a[i]` in the least-squares sense. The
/// result is exact for three or more non-collinear, noise-free correspondences.
///
/// # Errors
///
/// Fails on mismatched lengths, fewer than three correspondences, non-finite coordinates,
/// or collinear points.
pub fn compute_absolute_orientation(a: &[DVec3], b: &[DVec3]) -> Result<SE3F64, AbsOrientError> {
    check_correspondences(a, b, 3)?;

    let mu_a = compute_centroid(a);
    let mu_b = compute_centroid(b);

    let h = cross_covariance(a, b, mu_a, mu_b);
    let fit = fit_rotation(&h)?;

    let translation = mu_b - fit.rotation * mu_a;

    Ok(SE3F64::new(SO3F64::from_matrix(&fit.rotation), translation))
}

/// Compute the similarity transformation between two corresponding point sets.
///
/// Same as [`compute_absolute_orientation`], with the scale recovered from the SVD as
/// `s = trace(D * S) / Σ |a_i - a_mean|^2` and the translation `t = b_mean - s * R * a_mean`.
///
/// # Arguments
///
/// * `a` - Source points.
/// * `b` - Target points, `b[i]` corresponds to `a[i]`.
///
/// # Returns
///
/// The similarity such that `b[i] ≈ T * (s * a[i])`.
///
/// # Errors
///
/// Fails on mismatched lengths, fewer than three correspondences, non-finite coordinates,
/// collinear points, or when all source points coincide ([`AbsOrientError::ZeroVariance`]).
pub fn compute_similarity(a: &[DVec3], b: &[DVec3]) -> Result<Similarity, AbsOrientError> {
    check_correspondences(a, b, 3)?;

    let mu_a = compute_centroid(a);
    let mu_b = compute_centroid(b);

    // coincident points leave only rounding noise in the centered coordinates
    let var_a = a.iter().map(|p| (*p - mu_a).length_squared()).sum::<f64>();
    let norm_a = a.iter().map(|p| p.length_squared()).sum::<f64>();
    if var_a <= ZERO_VARIANCE_EPSILON * norm_a {
        log::debug!("zero variance source points: {} (norm {})", var_a, norm_a);
        return Err(AbsOrientError::ZeroVariance);
    }

    let h = cross_covariance(a, b, mu_a, mu_b);
    let fit = fit_rotation(&h)?;

    let scale = fit.trace_ds / var_a;
    if !scale.is_finite() || scale <= 0.0 {
        log::debug!("invalid similarity scale: {}", scale);
        return Err(AbsOrientError::DegenerateConfiguration {
            largest: fit.singular_values[0],
            second: fit.singular_values[1],
        });
    }

    let translation = mu_b - scale * (fit.rotation * mu_a);

    Ok(Similarity {
        transform: SE3F64::new(SO3F64::from_matrix(&fit.rotation), translation),
        scale,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::DMat3;

    fn square() -> [DVec3; 4] {
        [
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(1.0, 1.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_absolute_orientation_synthetic_z90() -> Result<(), AbsOrientError> {
        // True transform: 90° about Z, plus translation
        let r = DMat3::from_cols_array(&[0.0, 1.0, 0.0, -1.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
        let t = DVec3::new(0.5, -0.3, 2.0);
        let src = square();
        let dst: Vec<DVec3> = src.iter().map(|p| r * *p + t).collect();

        let est = compute_absolute_orientation(&src, &dst)?;
        assert!(est.rotation.matrix().abs_diff_eq(r, 1e-12));
        assert!(est.translation.abs_diff_eq(t, 1e-12));
        Ok(())
    }

    #[test]
    fn test_absolute_orientation_translation_only() -> Result<(), AbsOrientError> {
        let t = DVec3::new(5.0, -3.0, 2.0);
        let src = [DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z];
        let dst: Vec<DVec3> = src.iter().map(|p| *p + t).collect();

        let est = compute_absolute_orientation(&src, &dst)?;
        assert!(est.rotation.matrix().abs_diff_eq(DMat3::IDENTITY, 1e-12));
        assert!(est.translation.abs_diff_eq(t, 1e-12));
        Ok(())
    }

    #[test]
    fn test_absolute_orientation_mirrored() -> Result<(), AbsOrientError> {
        let src = [
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.1, 0.0),
            DVec3::new(0.2, 1.0, 0.3),
            DVec3::new(0.1, -0.2, 1.0),
        ];
        let dst: Vec<DVec3> = src.iter().map(|p| DVec3::new(-p.x, p.y, p.z)).collect();

        let est = compute_absolute_orientation(&src, &dst)?;
        assert_relative_eq!(est.rotation.matrix().determinant(), 1.0, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn test_absolute_orientation_errors() {
        let src = square();
        assert!(matches!(
            compute_absolute_orientation(&src[..2], &src[..2]),
            Err(AbsOrientError::InsufficientCorrespondences {
                required: 3,
                actual: 2
            })
        ));
        let line = [DVec3::ZERO, DVec3::X, DVec3::X * 2.0];
        assert!(matches!(
            compute_absolute_orientation(&line, &line),
            Err(AbsOrientError::DegenerateConfiguration { .. })
        ));
    }

    #[test]
    fn test_non_finite_points() {
        let src = [DVec3::X, DVec3::Y, DVec3::new(f64::NAN, 0.0, 1.0)];
        let dst = [DVec3::Y, DVec3::Z, DVec3::X];
        assert!(matches!(
            compute_absolute_orientation(&src, &dst),
            Err(AbsOrientError::NonFiniteInput)
        ));
        assert!(matches!(
            compute_similarity(&src, &dst),
            Err(AbsOrientError::NonFiniteInput)
        ));

        let dst = [DVec3::Y, DVec3::new(0.0, 0.0, f64::INFINITY), DVec3::X];
        let src = square();
        assert!(matches!(
            compute_absolute_orientation(&src[..3], &dst),
            Err(AbsOrientError::NonFiniteInput)
        ));
        assert!(matches!(
            compute_similarity(&src[..3], &dst),
            Err(AbsOrientError::NonFiniteInput)
        ));
    }

    #[test]
    fn test_overflowing_points() {
        // finite coordinates whose products overflow
        let src = [
            DVec3::new(1e200, 0.0, 0.0),
            DVec3::new(0.0, 1e200, 0.0),
            DVec3::new(0.0, 0.0, -1e200),
        ];
        assert!(matches!(
            compute_absolute_orientation(&src, &src),
            Err(AbsOrientError::NonFiniteInput)
        ));
    }

    #[test]
    fn test_similarity_recovers_scale() -> Result<(), AbsOrientError> {
        let rot = SO3F64::exp(DVec3::new(0.4, 0.1, -0.9));
        let t = DVec3::new(-1.0, 0.25, 3.0);
        let s = 2.5;
        let src = [
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.5, 0.0),
            DVec3::new(0.0, 1.0, 0.2),
            DVec3::new(0.3, 0.0, 1.0),
            DVec3::new(-0.6, 0.8, 0.4),
        ];
        let dst: Vec<DVec3> = src.iter().map(|p| rot * (s * *p) + t).collect();

        let est = compute_similarity(&src, &dst)?;
        assert_relative_eq!(est.scale, s, epsilon = 1e-10);
        assert!(est.transform.rotation.matrix().abs_diff_eq(rot.matrix(), 1e-10));
        assert!(est.transform.translation.abs_diff_eq(t, 1e-10));
        for (p, q) in src.iter().zip(dst.iter()) {
            assert!(est.transform_point(*p).abs_diff_eq(*q, 1e-10));
        }
        Ok(())
    }

    #[test]
    fn test_similarity_unit_scale() -> Result<(), AbsOrientError> {
        let src = square();
        let est = compute_similarity(&src, &src)?;
        assert_relative_eq!(est.scale, 1.0, epsilon = 1e-12);
        assert!(est.transform.translation.abs_diff_eq(DVec3::ZERO, 1e-12));
        Ok(())
    }

    #[test]
    fn test_similarity_zero_variance() {
        let src = [DVec3::ONE; 3];
        let dst = [DVec3::X, DVec3::Y, DVec3::Z];
        assert!(matches!(
            compute_similarity(&src, &dst),
            Err(AbsOrientError::ZeroVariance)
        ));

        // coordinates not exactly representable, the centroid picks up rounding error
        let src = [DVec3::new(0.1, 0.7, 1.3); 3];
        assert!(matches!(
            compute_similarity(&src, &dst),
            Err(AbsOrientError::ZeroVariance)
        ));

        let src = [DVec3::ZERO; 4];
        assert!(matches!(
            compute_similarity(&src, &square()),
            Err(AbsOrientError::ZeroVariance)
        ));
    }

    #[test]
    fn test_similarity_small_spread_far_from_origin() -> Result<(), AbsOrientError> {
        let offset = DVec3::new(1e3, -2e3, 5e2);
        let src: Vec<DVec3> = square().iter().map(|p| *p * 1e-2 + offset).collect();
        let dst: Vec<DVec3> = src.iter().map(|p| *p * 3.0).collect();
        let est = compute_similarity(&src, &dst)?;
        assert_relative_eq!(est.scale, 3.0, epsilon = 1e-6);
        Ok(())
    }
}
