//! Construction-time error taxonomy.
//!
//! Query-time outcomes are never errors (see the crate-level docs): a beam
//! that fails to validate simply contributes no path. Only malformed input
//! geometry or configuration at [`crate::Solver::new`] is fatal.

use thiserror::Error;

/// Fatal failures surfaced synchronously from [`crate::Solver::new`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeometryError {
    /// A polygon was given fewer than 3 vertices.
    #[error("polygon {polygon_index} has {vertex_count} vertices; at least 3 are required")]
    TooFewVertices {
        polygon_index: usize,
        vertex_count: usize,
    },

    /// A polygon's vertices are not coplanar within tolerance.
    #[error(
        "polygon {polygon_index} is not coplanar (max deviation {max_deviation} exceeds tolerance)"
    )]
    NonCoplanarVertices {
        polygon_index: usize,
        max_deviation: f32,
    },

    /// A polygon has (numerically) zero area.
    #[error("polygon {polygon_index} has zero area")]
    ZeroArea { polygon_index: usize },

    /// `max_reflection_order` was negative.
    #[error("max_reflection_order must be >= 0, got {value}")]
    InvalidReflectionOrder { value: i64 },

    /// `bucket_size` was less than 1.
    #[error("bucket_size must be >= 1, got {value}")]
    InvalidBucketSize { value: i64 },
}
