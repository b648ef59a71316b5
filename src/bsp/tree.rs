//! BSP tree container, construction, and first-hit ray queries.

use nalgebra::{Point3, Vector3};

use crate::cuttable::Cuttable;
use crate::plane::Classification;
use crate::polygon::Polygon;
use crate::tolerance::PARALLEL_EPSILON;

use super::node::{faces_same_direction, BspNode};
use super::selector::PlaneSelector;

/// A Binary Space Partitioning tree over a fixed scene of polygons.
///
/// Polygons are identified by their position in the original input list.
/// Splitting a polygon during construction produces new geometry but the
/// pieces keep the parent's id, so a ray query can always report which
/// *original* scene polygon it hit, even when the hit lands on a piece
/// produced by several splits.
#[derive(Debug, Clone, Default)]
pub struct BspTree {
    root: Option<BspNode>,
}

/// Result of a successful [`BspTree::ray_trace`] query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Ray parameter at the hit, i.e. `point = origin + t * dir`.
    pub t: f32,
    /// World-space hit position.
    pub point: Point3<f32>,
    /// Original id of the polygon that was hit.
    pub polygon_id: usize,
}

impl BspTree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Builds a tree from `(original_id, polygon)` pairs using the given
    /// [`PlaneSelector`] strategy.
    pub fn build<S: PlaneSelector>(polygons: Vec<(usize, Polygon)>, selector: &S) -> Self {
        Self {
            root: build_node(polygons, selector),
        }
    }

    /// Builds a tree from a polygon slice, using positional index as id.
    pub fn from_polygons<S: PlaneSelector>(polygons: &[Polygon], selector: &S) -> Self {
        let tagged: Vec<(usize, Polygon)> = polygons.iter().cloned().enumerate().collect();
        Self::build(tagged, selector)
    }

    /// Returns `true` if the tree contains no polygons.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns a reference to the root node, if any.
    #[inline]
    pub fn root(&self) -> Option<&BspNode> {
        self.root.as_ref()
    }

    /// Returns the total number of polygon pieces stored in the tree
    /// (after splitting; may exceed the original scene polygon count).
    pub fn polygon_count(&self) -> usize {
        self.root.as_ref().map_or(0, |n| n.polygon_count())
    }

    /// Returns the maximum depth of the tree (0 for an empty tree).
    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, |n| n.depth())
    }

    /// First-hit ray query (`rayTraceBSP`, spec §4.3).
    ///
    /// Finds the smallest-`t` hit of the ray `origin + t·dir` within
    /// `[t_min, t_max]`, excluding `ignore_id` (used to suppress
    /// self-intersection when the ray starts on a polygon's own surface).
    /// Returns `None` if nothing is hit in range.
    pub fn ray_trace(
        &self,
        origin: Point3<f32>,
        dir: Vector3<f32>,
        t_min: f32,
        t_max: f32,
        ignore_id: Option<usize>,
    ) -> Option<RayHit> {
        let root = self.root.as_ref()?;
        ray_trace_node(root, origin, dir, t_min, t_max, ignore_id)
    }
}

/// Recursively builds a BSP node from a list of `(id, polygon)` pairs.
fn build_node<S: PlaneSelector>(
    mut polygons: Vec<(usize, Polygon)>,
    selector: &S,
) -> Option<BspNode> {
    if polygons.is_empty() {
        return None;
    }

    let splitter_idx = selector.select(&polygons)?;
    let (splitter_id, splitter_poly) = polygons.swap_remove(splitter_idx);
    let plane = splitter_poly.plane();

    let mut coplanar_front = Vec::new();
    let mut coplanar_back = Vec::new();
    let mut front_list = Vec::new();
    let mut back_list = Vec::new();

    if faces_same_direction(&splitter_poly, &plane) {
        coplanar_front.push((splitter_id, splitter_poly));
    } else {
        coplanar_back.push((splitter_id, splitter_poly));
    }

    for (id, polygon) in polygons {
        match polygon.classify(&plane) {
            Classification::Front => front_list.push((id, polygon)),
            Classification::Back => back_list.push((id, polygon)),
            Classification::Coplanar => {
                if faces_same_direction(&polygon, &plane) {
                    coplanar_front.push((id, polygon));
                } else {
                    coplanar_back.push((id, polygon));
                }
            }
            Classification::Spanning => {
                let (front_part, back_part) = polygon.cut(&plane);
                if let Some(f) = front_part {
                    front_list.push((id, f));
                }
                if let Some(b) = back_part {
                    back_list.push((id, b));
                }
            }
        }
    }

    let mut node = BspNode::with_coplanar(plane, coplanar_front, coplanar_back);
    node.set_front(build_node(front_list, selector));
    node.set_back(build_node(back_list, selector));
    Some(node)
}

/// Walks a node per spec §4.3: classify the ray origin against the node's
/// plane to pick the near/far child ordering, recurse near first within the
/// sub-range up to the split point, test this node's own polygons, then
/// fall back to the far child for the remainder of the range.
fn ray_trace_node(
    node: &BspNode,
    origin: Point3<f32>,
    dir: Vector3<f32>,
    t_min: f32,
    t_max: f32,
    ignore_id: Option<usize>,
) -> Option<RayHit> {
    if t_min > t_max {
        return None;
    }

    let plane = node.plane();
    let sd = plane.signed_distance(origin);
    let (near, far) = if sd >= 0.0 {
        (node.front(), node.back())
    } else {
        (node.back(), node.front())
    };

    let denom = plane.normal().dot(&dir);
    let t_split = if denom.abs() < PARALLEL_EPSILON {
        None
    } else {
        Some(-sd / denom)
    };

    let stays_near = match t_split {
        None => true,
        Some(t) => t < t_min || t > t_max,
    };

    if stays_near {
        return near.and_then(|n| ray_trace_node(n, origin, dir, t_min, t_max, ignore_id));
    }
    let t_split = t_split.unwrap();

    if let Some(n) = near {
        if let Some(hit) = ray_trace_node(n, origin, dir, t_min, t_split, ignore_id) {
            return Some(hit);
        }
    }

    if let Some(hit) = test_node_polygons(node, origin, dir, t_min, t_max, ignore_id) {
        return Some(hit);
    }

    far.and_then(|n| ray_trace_node(n, origin, dir, t_split, t_max, ignore_id))
}

/// Tests every polygon piece stored at this node (both coplanar-front and
/// coplanar-back lists), keeping the closest in-range hit that isn't
/// `ignore_id`.
fn test_node_polygons(
    node: &BspNode,
    origin: Point3<f32>,
    dir: Vector3<f32>,
    t_min: f32,
    t_max: f32,
    ignore_id: Option<usize>,
) -> Option<RayHit> {
    node.all_coplanar()
        .filter(|(id, _)| Some(*id) != ignore_id)
        .filter_map(|(id, polygon)| {
            polygon.ray_intersect(origin, dir).and_then(|(t, point)| {
                if t >= t_min && t <= t_max {
                    Some(RayHit {
                        t,
                        point,
                        polygon_id: *id,
                    })
                } else {
                    None
                }
            })
        })
        .min_by(|a, b| a.t.partial_cmp(&b.t).unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsp::selector::FirstPolygon;
    use nalgebra::Vector3;

    fn square(center_z: f32) -> Polygon {
        Polygon::new(vec![
            Point3::new(-1.0, -1.0, center_z),
            Point3::new(1.0, -1.0, center_z),
            Point3::new(1.0, 1.0, center_z),
            Point3::new(-1.0, 1.0, center_z),
        ])
    }

    #[test]
    fn empty_tree_ray_trace_misses() {
        let tree = BspTree::new();
        let hit = tree.ray_trace(
            Point3::new(0.0, 0.0, 5.0),
            Vector3::new(0.0, 0.0, -1.0),
            0.0,
            100.0,
            None,
        );
        assert!(hit.is_none());
    }

    #[test]
    fn single_polygon_hit_reports_original_id() {
        let tree = BspTree::from_polygons(&[square(0.0)], &FirstPolygon);
        let hit = tree
            .ray_trace(
                Point3::new(0.0, 0.0, 5.0),
                Vector3::new(0.0, 0.0, -1.0),
                0.0,
                100.0,
                None,
            )
            .unwrap();
        assert_eq!(hit.polygon_id, 0);
        assert!((hit.t - 5.0).abs() < 1e-4);
    }

    #[test]
    fn ignore_id_suppresses_self_hit() {
        let tree = BspTree::from_polygons(&[square(0.0)], &FirstPolygon);
        let hit = tree.ray_trace(
            Point3::new(0.0, 0.0, 5.0),
            Vector3::new(0.0, 0.0, -1.0),
            0.0,
            100.0,
            Some(0),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn split_polygon_pieces_retain_original_id() {
        // A spanning polygon cut in two, plus a perpendicular splitter: a ray
        // hitting either half should still report the original scene id.
        let splitter = square(0.0);
        let spanning = Polygon::new(vec![
            Point3::new(-0.5, -2.0, 0.5),
            Point3::new(0.5, -2.0, 0.5),
            Point3::new(0.5, 2.0, 0.5),
            Point3::new(-0.5, 2.0, 0.5),
        ]);
        let tree = BspTree::from_polygons(&[splitter, spanning], &FirstPolygon);

        let hit = tree
            .ray_trace(
                Point3::new(0.0, -1.5, 0.5),
                Vector3::new(0.0, 1.0, 0.0),
                0.0,
                100.0,
                None,
            )
            .unwrap();
        assert_eq!(hit.polygon_id, 1);
    }

    #[test]
    fn nearest_hit_wins_over_farther_polygon() {
        let near = square(2.0);
        let far = square(-2.0);
        let tree = BspTree::from_polygons(&[far, near], &FirstPolygon);

        let hit = tree
            .ray_trace(
                Point3::new(0.0, 0.0, 10.0),
                Vector3::new(0.0, 0.0, -1.0),
                0.0,
                100.0,
                None,
            )
            .unwrap();
        assert!((hit.t - 8.0).abs() < 1e-4);
    }
}
