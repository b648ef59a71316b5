//! Beam tree: image sources, their bounding cones, and the fail-plane
//! cache slot carried by every node (spec components C4 and C5).
//!
//! # Architecture
//!
//! - [`BeamTree`]: the arena of [`BeamNode`]s plus the flat leaf list used
//!   for bucketing (spec §9's "leaves as a flat slice" design note)
//! - [`build_boundary_planes`]: the cone-construction primitive (spec §4.5)
//! - [`FailPlaneKind`]: tags which boundary last invalidated a beam

mod boundary;
mod node;
mod tree;

pub use boundary::build_boundary_planes;
pub use node::{BeamNode, FailPlaneKind};
pub use tree::BeamTree;
