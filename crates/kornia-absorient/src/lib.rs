#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Kornia Absolute Orientation
//!
//! Closed-form least-squares alignment of corresponding 3D point sets after
//! Umeyama, plus a few related rotation utilities:
//!
//! - [`compute_orientation`]: rotation between two point sets
//! - [`compute_orientation_from_rays`]: rotation between two pairs of rays, without SVD
//! - [`compute_absolute_orientation`]: rigid transformation (rotation + translation)
//! - [`compute_similarity`]: rigid transformation and uniform scale
//! - [`compute_mean_orientation`]: Karcher mean of a set of rotations
//! - [`quaternion_to_matrix`]: unit quaternion to rotation matrix
//!
//! All functions are pure and can be called concurrently.
//!
//! ## Example
//!
//! ```rust
//! use glam::DVec3;
//! use kornia_absorient::{compute_absolute_orientation, SE3F64, SO3F64};
//!
//! let dst_t_src = SE3F64::new(
//!     SO3F64::from_axis_angle(DVec3::Z, std::f64::consts::FRAC_PI_2),
//!     DVec3::new(1.0, 2.0, 3.0),
//! );
//! let src = [DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z];
//! let dst: Vec<DVec3> = src.iter().map(|p| dst_t_src * *p).collect();
//!
//! let est = compute_absolute_orientation(&src, &dst).unwrap();
//! assert!(est.translation.abs_diff_eq(dst_t_src.translation, 1e-9));
//! ```

mod absolute;
pub use absolute::{compute_absolute_orientation, compute_similarity};

/// Error types for the solvers.
pub mod error;
pub use error::AbsOrientError;

mod mean;
pub use mean::{compute_mean_orientation, MeanOrientationParams, MeanOrientationResult};

mod ops;

mod orientation;
pub use orientation::{compute_orientation, compute_orientation_from_rays};

/// Quaternion conversions.
pub mod quaternion;
pub use quaternion::{matrix_to_quaternion, quaternion_to_matrix};

/// Rigid and similarity transformations in 3D.
pub mod se3;
pub use se3::{SE3F64, Similarity};

/// Special Orthogonal group SO(3) for 3D rotations.
pub mod so3;
pub use so3::SO3F64;
