use thiserror::Error;

/// Error type for the absolute orientation solvers.
#[derive(Debug, Error)]
pub enum AbsOrientError {
    /// The input sequence is empty.
    #[error("Input sequence must not be empty")]
    EmptyInput,

    /// Source and target sequences must have the same length.
    #[error("Mismatched input lengths: source ({source_len}) != target ({target_len})")]
    MismatchedInputLengths {
        /// Number of source points.
        source_len: usize,
        /// Number of target points.
        target_len: usize,
    },

    /// Not enough correspondences for the requested solver.
    #[error("Solver requires at least {required} correspondences, got {actual}")]
    InsufficientCorrespondences {
        /// Minimum number of correspondences required by the solver.
        required: usize,
        /// Actual number of correspondences provided.
        actual: usize,
    },

    /// The cross-covariance has rank below two, so the rotation is not unique.
    #[error("Degenerate point configuration: singular values {largest} and {second}")]
    DegenerateConfiguration {
        /// Largest singular value of the cross-covariance.
        largest: f64,
        /// Second largest singular value of the cross-covariance.
        second: f64,
    },

    /// An input holds a NaN or infinite coordinate.
    #[error("Input contains non-finite values")]
    NonFiniteInput,

    /// The two rays of a pair are zero or (nearly) parallel.
    #[error("Rays are zero-length or parallel, the orientation is undefined")]
    ParallelRays,

    /// All source points coincide, the scale is undefined.
    #[error("Source points have zero variance, the scale is undefined")]
    ZeroVariance,

    /// The quaternion is not of unit norm.
    #[error("Quaternion must have unit norm, got {0}")]
    NonUnitQuaternion(f64),

    /// Failed to compute U in SVD
    #[error("Failed to compute U in SVD")]
    SvdU,

    /// Failed to compute V^T in SVD
    #[error("Failed to compute V^T in SVD")]
    SvdVT,
}
