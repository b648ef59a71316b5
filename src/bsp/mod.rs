//! Binary Space Partitioning tree for first-hit ray queries over a fixed
//! polygon scene.
//!
//! This module provides the BSP tree used by the beam-tracing solver's
//! occlusion tests (spec component C3): polygons are partitioned into a
//! binary tree of splitting planes at construction time, and
//! [`BspTree::ray_trace`] finds the nearest polygon hit along a ray in
//! `O(log n)` expected time rather than testing every scene polygon.
//!
//! # Architecture
//!
//! - [`BspTree`]: the container holding the root node and the ray query
//! - [`BspNode`]: internal nodes storing a splitting plane and the
//!   polygon(s) coplanar with it
//! - [`PlaneSelector`]: strategy trait for choosing splitting planes

mod node;
mod selector;
mod tree;

pub use node::{faces_same_direction, BspNode};
pub use selector::{BalancedSelector, FirstPolygon, PlaneSelector};
pub use tree::{BspTree, RayHit};
