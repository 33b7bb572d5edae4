//! Scalar and linear-algebra type aliases used throughout the crate.

use na::{Point3, Vector3};

/// The scalar type used throughout this crate.
///
/// The decomposition always runs in double precision; single precision
/// inputs are converted at the API boundary.
pub type Real = f64;

/// The point type.
pub type Point = Point3<Real>;

/// The vector type.
pub type Vector = Vector3<Real>;

/// The dimension of the space.
pub const DIM: usize = 3;
