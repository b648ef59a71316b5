//! BSP tree node implementation.

use crate::plane::Plane3D;
use crate::polygon::Polygon;

/// A node in the BSP tree.
///
/// Each node partitions space using a splitting plane and stores the
/// polygon(s) coplanar with that plane, tagged with their original scene
/// index (original IDs survive splits: a child produced by cutting a
/// polygon inherits its parent's id, so downstream self-intersection tests
/// stay correct). Polygons in front of or behind the plane live in the
/// respective child subtrees.
///
/// # Coplanar polygon storage
///
/// Coplanar polygons are separated by their facing direction relative to
/// the splitting plane's normal:
/// - `coplanar_front`: polygons whose normal points the same direction as the plane normal
/// - `coplanar_back`: polygons whose normal points opposite to the plane normal
///
/// This split exists purely to give a deterministic tie-break for
/// exactly-coplanar geometry during construction; ray queries test every
/// polygon at a node regardless of which list it landed in.
#[derive(Debug, Clone)]
pub struct BspNode {
    plane: Plane3D,
    coplanar_front: Vec<(usize, Polygon)>,
    coplanar_back: Vec<(usize, Polygon)>,
    front: Option<Box<BspNode>>,
    back: Option<Box<BspNode>>,
}

impl BspNode {
    /// Creates a new BSP node with a splitting plane and initial coplanar polygons.
    pub fn with_coplanar(
        plane: Plane3D,
        coplanar_front: Vec<(usize, Polygon)>,
        coplanar_back: Vec<(usize, Polygon)>,
    ) -> Self {
        Self {
            plane,
            coplanar_front,
            coplanar_back,
            front: None,
            back: None,
        }
    }

    /// Returns a reference to the splitting plane.
    #[inline]
    pub fn plane(&self) -> &Plane3D {
        &self.plane
    }

    /// Returns coplanar polygons facing the same direction as the plane normal.
    #[inline]
    pub fn coplanar_front(&self) -> &[(usize, Polygon)] {
        &self.coplanar_front
    }

    /// Returns coplanar polygons facing opposite to the plane normal.
    #[inline]
    pub fn coplanar_back(&self) -> &[(usize, Polygon)] {
        &self.coplanar_back
    }

    /// Returns all coplanar polygons at this node (both front- and back-facing).
    pub fn all_coplanar(&self) -> impl Iterator<Item = &(usize, Polygon)> {
        self.coplanar_front.iter().chain(self.coplanar_back.iter())
    }

    /// Returns the number of coplanar polygons at this node.
    pub fn coplanar_count(&self) -> usize {
        self.coplanar_front.len() + self.coplanar_back.len()
    }

    /// Returns a reference to the front child subtree.
    #[inline]
    pub fn front(&self) -> Option<&BspNode> {
        self.front.as_deref()
    }

    /// Returns a reference to the back child subtree.
    #[inline]
    pub fn back(&self) -> Option<&BspNode> {
        self.back.as_deref()
    }

    /// Sets the front child subtree.
    #[inline]
    pub fn set_front(&mut self, node: Option<BspNode>) {
        self.front = node.map(Box::new);
    }

    /// Sets the back child subtree.
    #[inline]
    pub fn set_back(&mut self, node: Option<BspNode>) {
        self.back = node.map(Box::new);
    }

    /// Checks if this node has any children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.front.is_none() && self.back.is_none()
    }

    /// Returns the total number of polygons in this subtree (including all descendants).
    pub fn polygon_count(&self) -> usize {
        let mut count = self.coplanar_count();
        if let Some(ref front) = self.front {
            count += front.polygon_count();
        }
        if let Some(ref back) = self.back {
            count += back.polygon_count();
        }
        count
    }

    /// Returns the depth of this subtree (1 for a leaf node).
    pub fn depth(&self) -> usize {
        let front_depth = self.front.as_ref().map_or(0, |n| n.depth());
        let back_depth = self.back.as_ref().map_or(0, |n| n.depth());
        1 + front_depth.max(back_depth)
    }
}

/// Determines if a polygon faces the same direction as a plane.
///
/// Compares the polygon's normal to the plane's normal using the dot
/// product. Returns `true` if the normals point in roughly the same
/// direction (strictly `dot > 0.0`) — this strict inequality is also the
/// deterministic tie-break for exactly-anti-parallel normals: they fall to
/// `coplanar_back`.
///
/// # Panics
/// Panics if the polygon has a degenerate (zero-length) normal.
#[inline]
pub fn faces_same_direction(polygon: &Polygon, plane: &Plane3D) -> bool {
    let poly_normal = polygon
        .unit_normal()
        .expect("Polygon must have a valid normal for BSP operations");
    poly_normal.dot(&plane.normal()) > 0.0
}
