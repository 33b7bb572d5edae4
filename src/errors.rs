//! Error taxonomy of the decomposition engine.

use thiserror::Error;

/// Every failure a [`Decomposer`](crate::Decomposer) can report.
///
/// Input validation failures are returned eagerly by `compute`, before any
/// voxelization happens. Query failures (`NotReady`, `OutOfRange`,
/// `Cancelled`) are recoverable by the caller and never expose partial
/// results.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DecompError {
    /// The vertex buffer is empty.
    #[error("the vertex buffer is empty")]
    EmptyPoints,
    /// The index buffer is empty.
    #[error("the index buffer is empty")]
    EmptyTriangles,
    /// The flat vertex buffer must contain three coordinates per vertex.
    #[error("the vertex buffer length ({0}) is not a multiple of 3")]
    MalformedPointBuffer(usize),
    /// The flat index buffer must contain three indices per triangle.
    #[error("the index buffer length ({0}) is not a multiple of 3")]
    MalformedIndexBuffer(usize),
    /// A vertex contains a NaN or infinite coordinate.
    #[error("vertex {0} has a non-finite coordinate")]
    NonFiniteCoordinate(usize),
    /// A triangle references a vertex that does not exist.
    #[error("triangle {triangle} references vertex {index}, but the mesh only has {num_points} vertices")]
    IndexOutOfBounds {
        /// Index of the offending triangle.
        triangle: usize,
        /// The out-of-bounds vertex index.
        index: u32,
        /// Number of vertices in the mesh.
        num_points: usize,
    },
    /// A result was queried before the decomposition completed.
    #[error("the decomposition has not completed yet")]
    NotReady,
    /// The decomposition was cancelled; no results are available.
    #[error("the decomposition was cancelled")]
    Cancelled,
    /// A convex hull was requested past the end of the result set.
    #[error("convex hull index {index} is out of range (hull count: {len})")]
    OutOfRange {
        /// The requested hull index.
        index: u32,
        /// Number of hulls produced by the finished run.
        len: u32,
    },
    /// `compute` was called while a previous run was still in flight.
    #[error("a decomposition is already in progress")]
    Busy,
}

impl DecompError {
    /// Does this error describe malformed input geometry?
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            DecompError::EmptyPoints
                | DecompError::EmptyTriangles
                | DecompError::MalformedPointBuffer(_)
                | DecompError::MalformedIndexBuffer(_)
                | DecompError::NonFiniteCoordinate(_)
                | DecompError::IndexOutOfBounds { .. }
        )
    }
}
