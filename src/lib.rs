//! Accelerated beam-tracing engine for specular acoustic reflection paths.
//!
//! Given a fixed polyhedral enclosure and a fixed point source,
//! [`Solver`] precomputes a binary space partition (for `O(log n)`
//! occlusion queries) and an image-source beam tree (for candidate
//! reflection paths up to a configured order), then answers repeated
//! listener-position queries cheaply by caching, per beam, the
//! geometric plane that last proved it unreachable.
//!
//! Construction-time failures (malformed polygons, an invalid config)
//! are returned as a [`GeometryError`]; once a [`Solver`] exists, no
//! query ever fails — an unreachable beam simply contributes no path.

mod beam;
mod bsp;
mod cache;
mod cuttable;
mod error;
mod metrics;
mod path;
mod plane;
mod polygon;
mod solver;
mod tolerance;

pub use beam::{BeamNode, BeamTree, FailPlaneKind};
pub use bsp::{BalancedSelector, BspNode, BspTree, FirstPolygon, PlaneSelector, RayHit};
pub use cache::{Bucket, SkipSphere};
pub use cuttable::Cuttable;
pub use error::GeometryError;
pub use metrics::Metrics;
pub use path::{
    DetailedPath, DetailedReflection, DetailedSegment, PathPoint, ReflectionPath,
};
pub use plane::{Classification, Plane3D, PlaneSide};
pub use polygon::Polygon;
pub use solver::{BeamView, Solver, SolverConfig};
pub use tolerance::Tolerances;
