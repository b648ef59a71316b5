//! Beam-tree construction: enumerate image sources and their apertures
//! (spec §4.4).

use nalgebra::Point3;
use tracing::debug;

use crate::polygon::Polygon;
use crate::tolerance::Tolerances;

use super::boundary::build_boundary_planes;
use super::node::BeamNode;

/// The image-source tree: every non-root node is a virtual source reached
/// by reflecting the real source through a chain of polygons, bounded by a
/// polyhedral cone (its boundary planes).
///
/// Stored as an arena (`Vec<BeamNode>`) indexed by `usize`, with parent
/// back-pointers, so a leaf→root path-validation walk is a sequence of
/// index hops rather than following owned or shared pointers (spec §9's
/// "recursive tree data" design note).
#[derive(Debug, Clone)]
pub struct BeamTree {
    arena: Vec<BeamNode>,
    leaves: Vec<usize>,
}

impl BeamTree {
    /// Builds the beam tree for `polygons` (the full scene, positionally
    /// indexed) and `source`, to `max_order` reflections.
    pub fn build(
        polygons: &[Polygon],
        source: Point3<f32>,
        max_order: usize,
        tol: &Tolerances,
    ) -> Self {
        let mut arena = vec![BeamNode::root(source)];
        let mut leaves = Vec::new();

        if max_order == 0 {
            return Self { arena, leaves };
        }

        for (id, polygon) in polygons.iter().enumerate() {
            if !faces_point(polygon, source) {
                continue;
            }
            let virtual_source = polygon.plane().mirror_point(source);
            let boundary_planes = build_boundary_planes(virtual_source, polygon);
            let node = BeamNode::child(virtual_source, id, 0, polygon.clone(), boundary_planes, 1);
            let idx = arena.len();
            arena.push(node);
            arena[0].add_child(idx);

            if max_order >= 2 {
                build_children(&mut arena, idx, 2, max_order, polygons, tol);
            }
        }

        collect_leaves(&arena, 0, &mut leaves);
        debug!(
            leaf_count = leaves.len(),
            node_count = arena.len(),
            max_order,
            "beam tree built"
        );
        Self { arena, leaves }
    }

    /// Direct access to the node arena, e.g. for visualization export.
    pub fn arena(&self) -> &[BeamNode] {
        &self.arena
    }

    #[inline]
    pub fn node(&self, idx: usize) -> &BeamNode {
        &self.arena[idx]
    }

    #[inline]
    pub fn node_mut(&mut self, idx: usize) -> &mut BeamNode {
        &mut self.arena[idx]
    }

    /// The flat, deterministic leaf list used for bucketing (spec §4.4,
    /// §9's "leaves as a flat slice" design note).
    #[inline]
    pub fn leaves(&self) -> &[usize] {
        &self.leaves
    }

    #[inline]
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Every node with an aperture that is *not* a leaf: these contribute
    /// intermediate-order paths per spec §4.7, since a leaf-only walk would
    /// miss reflections whose subtree continued deeper.
    pub fn non_leaf_aperture_nodes(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.arena.len()).filter(move |&idx| {
            let node = &self.arena[idx];
            node.reflecting_id().is_some() && !node.children().is_empty()
        })
    }

    /// Clears every node's cached fail plane without altering topology
    /// (spec §3: "Clearing the cache erases fail planes on every node").
    pub fn clear_fail_planes(&mut self) {
        for node in &mut self.arena {
            node.clear_fail_plane();
        }
    }
}

/// Spec §4.4's source/virtual-source facing test: `polygon.normal() ·
/// (point − centroid) > 0`.
fn faces_point(polygon: &Polygon, point: Point3<f32>) -> bool {
    let centroid = polygon.centroid();
    polygon.normal().dot(&(point - centroid)) > 0.0
}

fn build_children(
    arena: &mut Vec<BeamNode>,
    parent_idx: usize,
    depth: usize,
    max_order: usize,
    polygons: &[Polygon],
    tol: &Tolerances,
) {
    let parent_reflecting_id = arena[parent_idx].reflecting_id();
    let parent_virtual_source = arena[parent_idx].virtual_source();
    let parent_boundary_planes = arena[parent_idx].boundary_planes().to_vec();

    for (id, polygon) in polygons.iter().enumerate() {
        if Some(id) == parent_reflecting_id {
            continue;
        }
        if polygon.is_outside_planes(&parent_boundary_planes) {
            continue;
        }
        if !faces_point(polygon, parent_virtual_source) {
            continue;
        }
        let Some(clipped) = polygon.clip_by_planes(&parent_boundary_planes) else {
            continue;
        };
        if clipped.area() < tol.min_aperture_area {
            continue;
        }

        let virtual_source = polygon.plane().mirror_point(parent_virtual_source);
        let boundary_planes = build_boundary_planes(virtual_source, &clipped);
        let node = BeamNode::child(virtual_source, id, parent_idx, clipped, boundary_planes, depth);
        let idx = arena.len();
        arena.push(node);
        arena[parent_idx].add_child(idx);

        if depth < max_order {
            build_children(arena, idx, depth + 1, max_order, polygons, tol);
        }
    }
}

fn collect_leaves(arena: &[BeamNode], idx: usize, leaves: &mut Vec<usize>) {
    let node = &arena[idx];
    if node.is_leaf() {
        leaves.push(idx);
        return;
    }
    for &child in node.children() {
        collect_leaves(arena, child, leaves);
    }
}
