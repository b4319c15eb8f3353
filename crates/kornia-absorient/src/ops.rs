use glam::{DMat3, DVec3};
use nalgebra::{Matrix3, Vector3, SVD};

use crate::error::AbsOrientError;

/// Relative threshold on the second singular value below which the
/// cross-covariance is treated as rank deficient.
const DEGENERACY_EPSILON: f64 = 1e-10;

/// Output of the SVD based rotation fit.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RotationFit {
    /// Proper rotation maximizing trace(R^T H).
    pub rotation: DMat3,
    /// trace(D * S), the singular values weighted by the reflection correction.
    pub trace_ds: f64,
    /// Singular values of H in descending order.
    pub singular_values: [f64; 3],
}

/// Validate a pair of corresponding point sequences.
pub(crate) fn check_correspondences(
    src: &[DVec3],
    dst: &[DVec3],
    required: usize,
) -> Result<(), AbsOrientError> {
    if src.len() != dst.len() {
        return Err(AbsOrientError::MismatchedInputLengths {
            source_len: src.len(),
            target_len: dst.len(),
        });
    }
    if src.is_empty() {
        return Err(AbsOrientError::EmptyInput);
    }
    if src.len() < required {
        return Err(AbsOrientError::InsufficientCorrespondences {
            required,
            actual: src.len(),
        });
    }
    if !src.iter().chain(dst.iter()).all(|p| p.is_finite()) {
        return Err(AbsOrientError::NonFiniteInput);
    }
    Ok(())
}

/// Compute the centroid of a set of points.
pub(crate) fn compute_centroid(pts: &[DVec3]) -> DVec3 {
    let n = pts.len() as f64;
    let sum = pts.iter().copied().fold(DVec3::ZERO, |acc, p| acc + p);
    sum / n
}

/// Cross-covariance H = Σ (dst_i - dst_mean) * (src_i - src_mean)^T.
///
/// Pass `DVec3::ZERO` as means to accumulate over the raw points.
pub(crate) fn cross_covariance(
    src: &[DVec3],
    dst: &[DVec3],
    src_mean: DVec3,
    dst_mean: DVec3,
) -> DMat3 {
    src.iter()
        .zip(dst.iter())
        .fold(DMat3::ZERO, |h, (&p_src, &p_dst)| {
            let sc = p_src - src_mean;
            let dc = p_dst - dst_mean;
            // column j of the outer product is dc * sc_j
            h + DMat3::from_cols(dc * sc.x, dc * sc.y, dc * sc.z)
        })
}

#[inline]
pub(crate) fn mat3_to_na(m: &DMat3) -> Matrix3<f64> {
    Matrix3::from_column_slice(&m.to_cols_array())
}

#[inline]
pub(crate) fn mat3_from_na(m: &Matrix3<f64>) -> DMat3 {
    DMat3::from_cols_slice(m.as_slice())
}

/// Umeyama rotation step: R = U * S * V^T with S = diag(1, 1, det(U * V^T)).
///
/// The sign is injected on the axis of the smallest singular value so that the
/// result is always a proper rotation.
pub(crate) fn fit_rotation(h: &DMat3) -> Result<RotationFit, AbsOrientError> {
    // finite points can still overflow when accumulated
    if !h.is_finite() {
        return Err(AbsOrientError::NonFiniteInput);
    }

    let svd = SVD::new(mat3_to_na(h), true, true);
    let Some(u) = svd.u else {
        return Err(AbsOrientError::SvdU);
    };
    let Some(v_t) = svd.v_t else {
        return Err(AbsOrientError::SvdVT);
    };
    let d = svd.singular_values;

    let mut sorted = [d[0], d[1], d[2]];
    sorted.sort_by(|a, b| b.total_cmp(a));
    if sorted[0] <= f64::MIN_POSITIVE || sorted[1] <= DEGENERACY_EPSILON * sorted[0] {
        log::debug!(
            "rank deficient cross-covariance, singular values: {:?}",
            sorted
        );
        return Err(AbsOrientError::DegenerateConfiguration {
            largest: sorted[0],
            second: sorted[1],
        });
    }

    let mut s = Vector3::repeat(1.0);
    if (u * v_t).determinant() < 0.0 {
        s[d.imin()] = -1.0;
    }

    let r = u * Matrix3::from_diagonal(&s) * v_t;

    Ok(RotationFit {
        rotation: mat3_from_na(&r),
        trace_ds: d.dot(&s),
        singular_values: sorted,
    })
}
