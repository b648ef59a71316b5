//! Beam-tree node: a virtual (image) source and its bounding cone.

use nalgebra::Point3;

use crate::plane::Plane3D;
use crate::polygon::Polygon;

/// Which boundary a listener was found strictly behind when a beam last
/// failed validation, cached on the node as its [`BeamNode::fail_plane`]
/// (spec §4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPlaneKind {
    /// The reflecting polygon's own plane, oriented toward the virtual source.
    Polygon,
    /// One of the aperture's edge cone planes.
    Edge,
    /// The aperture plane itself.
    Aperture,
}

/// A node in the beam tree.
///
/// The root node represents the real source: `reflecting_id` is `None`,
/// `aperture` and `boundary_planes` are empty, and `parent` is `None`.
/// Every other node is reached by mirroring its parent's virtual source
/// through `reflecting_id`'s polygon plane, bounded by `boundary_planes`
/// (spec §4.4/§4.5).
#[derive(Debug, Clone)]
pub struct BeamNode {
    virtual_source: Point3<f32>,
    reflecting_id: Option<usize>,
    parent: Option<usize>,
    aperture: Option<Polygon>,
    boundary_planes: Vec<Plane3D>,
    children: Vec<usize>,
    order: usize,
    fail_plane: Option<(Plane3D, FailPlaneKind)>,
}

impl BeamNode {
    /// Creates the tree root, representing the real source.
    pub fn root(source: Point3<f32>) -> Self {
        Self {
            virtual_source: source,
            reflecting_id: None,
            parent: None,
            aperture: None,
            boundary_planes: Vec::new(),
            children: Vec::new(),
            order: 0,
            fail_plane: None,
        }
    }

    /// Creates a non-root node for a reflection off `reflecting_id`.
    #[allow(clippy::too_many_arguments)]
    pub fn child(
        virtual_source: Point3<f32>,
        reflecting_id: usize,
        parent: usize,
        aperture: Polygon,
        boundary_planes: Vec<Plane3D>,
        order: usize,
    ) -> Self {
        Self {
            virtual_source,
            reflecting_id: Some(reflecting_id),
            parent: Some(parent),
            aperture: Some(aperture),
            boundary_planes,
            children: Vec::new(),
            order,
            fail_plane: None,
        }
    }

    #[inline]
    pub fn virtual_source(&self) -> Point3<f32> {
        self.virtual_source
    }

    #[inline]
    pub fn reflecting_id(&self) -> Option<usize> {
        self.reflecting_id
    }

    #[inline]
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    #[inline]
    pub fn aperture(&self) -> Option<&Polygon> {
        self.aperture.as_ref()
    }

    #[inline]
    pub fn boundary_planes(&self) -> &[Plane3D] {
        &self.boundary_planes
    }

    #[inline]
    pub fn children(&self) -> &[usize] {
        &self.children
    }

    /// Reflection order: 0 for the root (real source), 1 for a first
    /// reflection, and so on.
    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    /// A leaf is a non-root node with no children: its subtree stopped
    /// growing, either because it reached `max_reflection_order` or
    /// because every candidate reflector was pruned.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty() && self.reflecting_id.is_some()
    }

    pub(crate) fn add_child(&mut self, idx: usize) {
        self.children.push(idx);
    }

    #[inline]
    pub fn fail_plane(&self) -> Option<&(Plane3D, FailPlaneKind)> {
        self.fail_plane.as_ref()
    }

    pub fn set_fail_plane(&mut self, fail_plane: Option<(Plane3D, FailPlaneKind)>) {
        self.fail_plane = fail_plane;
    }

    pub fn clear_fail_plane(&mut self) {
        self.fail_plane = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_not_a_leaf() {
        let root = BeamNode::root(Point3::origin());
        assert!(!root.is_leaf());
        assert!(root.reflecting_id().is_none());
    }

    #[test]
    fn childless_non_root_is_leaf() {
        let child = BeamNode::child(
            Point3::new(1.0, 0.0, 0.0),
            3,
            0,
            Polygon::new(vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ]),
            Vec::new(),
            1,
        );
        assert!(child.is_leaf());
    }

    #[test]
    fn node_with_children_is_not_a_leaf() {
        let mut child = BeamNode::child(
            Point3::new(1.0, 0.0, 0.0),
            3,
            0,
            Polygon::new(vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ]),
            Vec::new(),
            1,
        );
        child.add_child(7);
        assert!(!child.is_leaf());
    }

    #[test]
    fn fail_plane_set_and_clear_round_trips() {
        let mut child = BeamNode::child(
            Point3::new(1.0, 0.0, 0.0),
            3,
            0,
            Polygon::new(vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ]),
            Vec::new(),
            1,
        );
        assert!(child.fail_plane().is_none());
        let plane = Plane3D::new(nalgebra::Vector3::new(0.0, 1.0, 0.0), 0.0);
        child.set_fail_plane(Some((plane, FailPlaneKind::Polygon)));
        assert!(child.fail_plane().is_some());
        child.clear_fail_plane();
        assert!(child.fail_plane().is_none());
    }
}
