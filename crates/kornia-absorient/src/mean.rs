use glam::DVec3;

use crate::error::AbsOrientError;
use crate::so3::SO3F64;

/// Parameters controlling the iterative mean orientation solver.
#[derive(Debug, Clone)]
pub struct MeanOrientationParams {
    /// Maximum number of iterations to perform.
    pub max_iterations: usize,
    /// Convergence tolerance on the norm of the mean tangent update, in radians.
    pub tolerance: f64,
}

impl Default for MeanOrientationParams {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-10,
        }
    }
}

/// Result of the mean orientation solver.
#[derive(Debug, Clone)]
pub struct MeanOrientationResult {
    /// The mean rotation, or the best estimate if the solver did not converge.
    pub rotation: SO3F64,
    /// The number of iterations performed.
    pub num_iterations: usize,
    /// Whether the tangent update fell below the tolerance.
    pub converged: bool,
}

/// Compute the mean (Karcher mean) of a set of rotations.
///
/// This is the rotation `R` minimizing `Σ |log(R^-1 * R_i)|^2`, computed by repeatedly
/// averaging the rotations in the tangent space of the current estimate:
///
/// `R <- R * exp(1/n * Σ log(R^-1 * R_i))`
///
/// starting from the first rotation. Unlike averaging matrix entries, the result is
/// always a proper rotation.
///
/// # Arguments
///
/// * `rotations` - The rotations to average.
/// * `params` - Iteration cap and convergence tolerance.
///
/// # Returns
///
/// The mean rotation with the iteration count. Widely spread (e.g. antipodal) sets may
/// not converge within `params.max_iterations`; the last estimate is then returned with
/// `converged == false`.
///
/// # Errors
///
/// Returns [`AbsOrientError::EmptyInput`] if `rotations` is empty and
/// [`AbsOrientError::NonFiniteInput`] if any rotation holds a NaN or infinite component.
pub fn compute_mean_orientation(
    rotations: &[SO3F64],
    params: &MeanOrientationParams,
) -> Result<MeanOrientationResult, AbsOrientError> {
    let Some(first) = rotations.first() else {
        return Err(AbsOrientError::EmptyInput);
    };
    if !rotations.iter().all(|r| r.q.is_finite()) {
        return Err(AbsOrientError::NonFiniteInput);
    }

    let n = rotations.len() as f64;
    let mut result = MeanOrientationResult {
        rotation: *first,
        num_iterations: 0,
        converged: false,
    };

    while result.num_iterations < params.max_iterations {
        let mean = result.rotation;
        let delta = rotations
            .iter()
            .fold(DVec3::ZERO, |acc, r| acc + mean.rminus(r))
            / n;

        result.rotation = mean.rplus(delta);
        result.num_iterations += 1;

        let step = delta.length();
        log::debug!("Iteration: {} step: {}", result.num_iterations, step);

        if step < params.tolerance {
            result.converged = true;
            break;
        }
    }

    if !result.converged {
        log::warn!(
            "mean orientation did not converge in {} iterations",
            params.max_iterations
        );
    }

    Ok(result)
}
