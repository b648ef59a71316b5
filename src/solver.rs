//! Top-level solver orchestration (spec component C7): per-listener
//! queries that combine the direct path, intermediate-order paths, and
//! the bucketed/cached leaf sweep into the public API.

use nalgebra::Point3;
use tracing::{debug, info, trace};

use crate::beam::BeamTree;
use crate::bsp::{BspTree, FirstPolygon};
use crate::cache::{compute_fail_plane, Bucket, SkipSphere};
use crate::error::GeometryError;
use crate::metrics::Metrics;
use crate::path::{try_direct_path, validate_path, DetailedPath, ReflectionPath};
use crate::polygon::Polygon;
use crate::tolerance::{Tolerances, COPLANARITY_EPSILON, MIN_POLYGON_AREA};

/// Recognized construction options (spec §6): `max_reflection_order` and
/// `bucket_size`, defaulting to 5 and 16.
///
/// Built fluently, matching the teacher's own builder idiom
/// (`OrbitCamera::with_zoom`/`with_target`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    max_reflection_order: i64,
    bucket_size: i64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_reflection_order: 5,
            bucket_size: 16,
        }
    }
}

impl SolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_reflection_order(mut self, value: i64) -> Self {
        self.max_reflection_order = value;
        self
    }

    pub fn with_bucket_size(mut self, value: i64) -> Self {
        self.bucket_size = value;
        self
    }

    #[inline]
    pub fn max_reflection_order(&self) -> i64 {
        self.max_reflection_order
    }

    #[inline]
    pub fn bucket_size(&self) -> i64 {
        self.bucket_size
    }
}

/// A single beam of the beam tree, as returned by
/// [`Solver::beams_for_visualization`] (spec §6).
#[derive(Debug, Clone, PartialEq)]
pub struct BeamView {
    pub virtual_source: Point3<f32>,
    pub aperture_vertices: Vec<Point3<f32>>,
    pub reflection_order: usize,
    pub polygon_id: usize,
}

/// Computes specular acoustic reflection paths between a fixed source and
/// a moving listener inside a polyhedral enclosure (spec §1).
///
/// Construction (the BSP tree, the beam tree, and the skip-sphere bucket
/// layout) is a one-time up-front cost driven by the scene and the
/// source; [`Solver::get_paths`] and [`Solver::get_detailed_paths`] are
/// the per-listener query entry points, and take `&mut self` because
/// they mutate the fail-plane and skip-sphere caches (spec §5).
#[derive(Debug, Clone)]
pub struct Solver {
    polygons: Vec<Polygon>,
    source: Point3<f32>,
    bsp: BspTree,
    beam_tree: BeamTree,
    buckets: Vec<Bucket>,
    max_reflection_order: usize,
    tolerances: Tolerances,
    metrics: Metrics,
}

impl Solver {
    /// Validates `polygons` and `config`, then builds the BSP tree and
    /// beam tree for `source`.
    ///
    /// Each polygon's normal must point toward the side it reflects sound
    /// from (spec §4.4's facing test): for an enclosure, that means every
    /// wall's winding must put its normal toward the interior where
    /// `source` and future listeners sit, not outward.
    ///
    /// Returns a [`GeometryError`] synchronously for malformed input
    /// geometry or an out-of-range config (spec §7); once constructed, no
    /// query ever fails — an unreachable beam simply contributes no path.
    pub fn new(
        polygons: Vec<Polygon>,
        source: Point3<f32>,
        config: SolverConfig,
    ) -> Result<Self, GeometryError> {
        if config.max_reflection_order < 0 {
            return Err(GeometryError::InvalidReflectionOrder {
                value: config.max_reflection_order,
            });
        }
        if config.bucket_size < 1 {
            return Err(GeometryError::InvalidBucketSize {
                value: config.bucket_size,
            });
        }

        for (polygon_index, polygon) in polygons.iter().enumerate() {
            let vertex_count = polygon.len();
            if vertex_count < 3 {
                return Err(GeometryError::TooFewVertices {
                    polygon_index,
                    vertex_count,
                });
            }
            let max_deviation = polygon.max_planar_deviation();
            if max_deviation >= COPLANARITY_EPSILON {
                return Err(GeometryError::NonCoplanarVertices {
                    polygon_index,
                    max_deviation,
                });
            }
            if polygon.area() < MIN_POLYGON_AREA {
                return Err(GeometryError::ZeroArea { polygon_index });
            }
        }

        let tolerances = Tolerances::default();
        let max_reflection_order = config.max_reflection_order as usize;
        let bucket_size = config.bucket_size as usize;

        let bsp = BspTree::from_polygons(&polygons, &FirstPolygon);
        let beam_tree = BeamTree::build(&polygons, source, max_reflection_order, &tolerances);
        let buckets = Bucket::partition(beam_tree.leaf_count(), bucket_size);

        info!(
            polygon_count = polygons.len(),
            bsp_depth = bsp.depth(),
            leaf_count = beam_tree.leaf_count(),
            bucket_count = buckets.len(),
            max_reflection_order,
            "solver constructed"
        );

        Ok(Self {
            polygons,
            source,
            bsp,
            beam_tree,
            buckets,
            max_reflection_order,
            tolerances,
            metrics: Metrics::default(),
        })
    }

    /// Computes every valid reflection path from the source to `listener`
    /// (spec §4.7/§4.9): the direct path, every intermediate-order aperture
    /// node, then the bucketed leaf sweep with skip-sphere/fail-plane
    /// caching.
    pub fn get_paths(&mut self, listener: Point3<f32>) -> Vec<ReflectionPath> {
        let mut metrics = Metrics {
            total_leaf_nodes: self.beam_tree.leaf_count(),
            buckets_total: self.buckets.len(),
            ..Metrics::default()
        };

        let mut paths = Vec::new();

        if let Some(path) = try_direct_path(
            &self.bsp,
            listener,
            self.source,
            &self.tolerances,
            &mut metrics.raycast_count,
        ) {
            paths.push(path);
        }

        let intermediate_nodes: Vec<usize> = self.beam_tree.non_leaf_aperture_nodes().collect();
        for node_idx in intermediate_nodes {
            if let Some(path) = validate_path(
                &self.beam_tree,
                &self.bsp,
                &self.polygons,
                node_idx,
                listener,
                self.source,
                &self.tolerances,
                &mut metrics.raycast_count,
            ) {
                paths.push(path);
            }
        }

        for bucket_idx in 0..self.buckets.len() {
            self.process_bucket(bucket_idx, listener, &mut paths, &mut metrics);
        }

        metrics.valid_path_count = paths.len();
        debug!(
            valid_paths = paths.len(),
            raycasts = metrics.raycast_count,
            "query complete"
        );
        self.metrics = metrics;
        paths
    }

    /// One bucket's worth of spec §4.9: a live skip sphere short-circuits
    /// the whole bucket; otherwise every leaf is answered from its cached
    /// fail plane or fully validated, and a fresh skip sphere is cached
    /// afterward if every member is still (and now provably) invalid.
    fn process_bucket(
        &mut self,
        bucket_idx: usize,
        listener: Point3<f32>,
        paths: &mut Vec<ReflectionPath>,
        metrics: &mut Metrics,
    ) {
        let leaf_indices: Vec<usize> = {
            let leaf_range = self.buckets[bucket_idx].leaf_range();
            self.beam_tree.leaves()[leaf_range].to_vec()
        };

        if let Some(sphere) = self.buckets[bucket_idx].skip_sphere().copied() {
            if sphere.contains(listener) {
                metrics.buckets_skipped += 1;
                trace!(bucket = bucket_idx, "skip sphere hit");
                return;
            }
            self.buckets[bucket_idx].set_skip_sphere(None);
            for &leaf_idx in &leaf_indices {
                self.beam_tree.node_mut(leaf_idx).clear_fail_plane();
            }
        }

        metrics.buckets_checked += 1;
        let mut all_failed = true;
        let mut all_have_fail_planes = true;
        let mut min_fail_distance = f32::INFINITY;

        for &leaf_idx in &leaf_indices {
            let cached = self.beam_tree.node(leaf_idx).fail_plane().cloned();
            if let Some((plane, _)) = &cached {
                if plane.signed_distance(listener) < 0.0 {
                    metrics.fail_plane_cache_hits += 1;
                    min_fail_distance = min_fail_distance.min(plane.signed_distance(listener).abs());
                    continue;
                }
                self.beam_tree.node_mut(leaf_idx).clear_fail_plane();
            }

            metrics.fail_plane_cache_misses += 1;
            let reflecting_id = self
                .beam_tree
                .node(leaf_idx)
                .reflecting_id()
                .expect("leaf node must have a reflector");

            let validated = validate_path(
                &self.beam_tree,
                &self.bsp,
                &self.polygons,
                leaf_idx,
                listener,
                self.source,
                &self.tolerances,
                &mut metrics.raycast_count,
            );

            match validated {
                Some(path) => {
                    all_failed = false;
                    paths.push(path);
                }
                None => {
                    let fail_plane = compute_fail_plane(
                        self.beam_tree.node(leaf_idx),
                        &self.polygons[reflecting_id],
                        listener,
                        &self.tolerances,
                    );
                    match &fail_plane {
                        Some((plane, _)) => {
                            min_fail_distance =
                                min_fail_distance.min(plane.signed_distance(listener).abs());
                        }
                        None => all_have_fail_planes = false,
                    }
                    self.beam_tree.node_mut(leaf_idx).set_fail_plane(fail_plane);
                }
            }
        }

        let radius_worth_caching = min_fail_distance.is_finite()
            && min_fail_distance > self.tolerances.min_skip_sphere_radius;
        if all_failed && all_have_fail_planes && radius_worth_caching {
            self.buckets[bucket_idx].set_skip_sphere(Some(SkipSphere {
                center: listener,
                radius: min_fail_distance,
            }));
            metrics.skip_sphere_count += 1;
        }
    }

    /// As [`Solver::get_paths`], with each reflection enriched with
    /// incidence-angle geometry (spec §6).
    pub fn get_detailed_paths(&mut self, listener: Point3<f32>) -> Vec<DetailedPath> {
        self.get_paths(listener)
            .iter()
            .map(|path| DetailedPath::from_path(path, &self.polygons, &self.tolerances))
            .collect()
    }

    /// Diagnostics from the most recent [`Solver::get_paths`] or
    /// [`Solver::get_detailed_paths`] call; zeroed before the first query.
    #[inline]
    pub fn metrics(&self) -> Metrics {
        self.metrics
    }

    /// Clears every leaf's cached fail plane and every bucket's skip
    /// sphere without altering the beam-tree topology (spec §3).
    pub fn clear_cache(&mut self) {
        self.beam_tree.clear_fail_planes();
        for bucket in &mut self.buckets {
            bucket.set_skip_sphere(None);
        }
    }

    /// Number of leaf nodes in the beam tree.
    #[inline]
    pub fn leaf_node_count(&self) -> usize {
        self.beam_tree.leaf_count()
    }

    /// The configured maximum reflection order.
    #[inline]
    pub fn max_reflection_order(&self) -> usize {
        self.max_reflection_order
    }

    /// The fixed source position this solver was built for.
    #[inline]
    pub fn source_position(&self) -> Point3<f32> {
        self.source
    }

    /// Every beam in the tree, as a flattened view suitable for rendering
    /// (spec §6), optionally limited to a maximum reflection order.
    pub fn beams_for_visualization(&self, max_order: Option<usize>) -> Vec<BeamView> {
        self.beam_tree
            .arena()
            .iter()
            .filter_map(|node| {
                let polygon_id = node.reflecting_id()?;
                if let Some(limit) = max_order {
                    if node.order() > limit {
                        return None;
                    }
                }
                let aperture = node.aperture()?;
                Some(BeamView {
                    virtual_source: node.virtual_source(),
                    aperture_vertices: aperture.vertices().to_vec(),
                    reflection_order: node.order(),
                    polygon_id,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    /// Six walls wound so each normal points into the box (spec §4.4's
    /// facing test requires this for an interior source to see them).
    fn shoebox(w: f32, d: f32, h: f32) -> Vec<Polygon> {
        let p = |x: f32, y: f32, z: f32| Point3::new(x, y, z);
        vec![
            Polygon::new(vec![p(0.0, 0.0, 0.0), p(w, 0.0, 0.0), p(w, d, 0.0), p(0.0, d, 0.0)]),
            Polygon::new(vec![p(0.0, 0.0, h), p(0.0, d, h), p(w, d, h), p(w, 0.0, h)]),
            Polygon::new(vec![p(0.0, 0.0, 0.0), p(0.0, d, 0.0), p(0.0, d, h), p(0.0, 0.0, h)]),
            Polygon::new(vec![p(w, 0.0, 0.0), p(w, 0.0, h), p(w, d, h), p(w, d, 0.0)]),
            Polygon::new(vec![p(0.0, 0.0, 0.0), p(0.0, 0.0, h), p(w, 0.0, h), p(w, 0.0, 0.0)]),
            Polygon::new(vec![p(0.0, d, 0.0), p(w, d, 0.0), p(w, d, h), p(0.0, d, h)]),
        ]
    }

    #[test]
    fn rejects_degenerate_zero_area_polygon() {
        let bad = Polygon::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        ]);
        let err = Solver::new(vec![bad], Point3::origin(), SolverConfig::default()).unwrap_err();
        assert!(matches!(err, GeometryError::ZeroArea { polygon_index: 0 }));
    }

    #[test]
    fn rejects_negative_max_reflection_order() {
        let polys = shoebox(4.0, 4.0, 3.0);
        let config = SolverConfig::new().with_max_reflection_order(-1);
        let err = Solver::new(polys, Point3::new(2.0, 2.0, 1.5), config).unwrap_err();
        assert_eq!(err, GeometryError::InvalidReflectionOrder { value: -1 });
    }

    #[test]
    fn rejects_zero_bucket_size() {
        let polys = shoebox(4.0, 4.0, 3.0);
        let config = SolverConfig::new().with_bucket_size(0);
        let err = Solver::new(polys, Point3::new(2.0, 2.0, 1.5), config).unwrap_err();
        assert_eq!(err, GeometryError::InvalidBucketSize { value: 0 });
    }

    #[test]
    fn direct_path_found_in_empty_line_of_sight() {
        let polys = shoebox(10.0, 8.0, 3.0);
        let source = Point3::new(5.0, 4.0, 1.5);
        let mut solver = Solver::new(polys, source, SolverConfig::default()).unwrap();
        let listener = Point3::new(5.0, 4.0, 1.0);
        let paths = solver.get_paths(listener);
        assert!(paths.iter().any(|p| p.reflection_order() == 0));
    }

    #[test]
    fn first_order_reflections_found_in_shoebox() {
        let polys = shoebox(10.0, 8.0, 3.0);
        let source = Point3::new(2.0, 2.0, 1.5);
        let config = SolverConfig::new().with_max_reflection_order(1);
        let mut solver = Solver::new(polys, source, config).unwrap();
        let listener = Point3::new(8.0, 6.0, 1.5);
        let paths = solver.get_paths(listener);
        assert!(paths.iter().any(|p| p.reflection_order() == 1));
    }

    #[test]
    fn clear_cache_does_not_change_query_result() {
        let polys = shoebox(10.0, 8.0, 3.0);
        let source = Point3::new(2.0, 2.0, 1.5);
        let config = SolverConfig::new().with_max_reflection_order(2);
        let mut solver = Solver::new(polys, source, config).unwrap();
        let listener = Point3::new(8.0, 6.0, 1.5);

        let mut before: Vec<f32> = solver
            .get_paths(listener)
            .iter()
            .map(|p| p.total_length())
            .collect();
        before.sort_by(|a, b| a.partial_cmp(b).unwrap());

        solver.clear_cache();

        let mut after: Vec<f32> = solver
            .get_paths(listener)
            .iter()
            .map(|p| p.total_length())
            .collect();
        after.sort_by(|a, b| a.partial_cmp(b).unwrap());

        assert_eq!(before.len(), after.len());
        for (b, a) in before.iter().zip(after.iter()) {
            assert!((b - a).abs() < 1e-3);
        }
    }

    #[test]
    fn repeated_queries_at_same_listener_are_stable() {
        let polys = shoebox(10.0, 8.0, 3.0);
        let source = Point3::new(2.0, 2.0, 1.5);
        let config = SolverConfig::new().with_max_reflection_order(2);
        let mut solver = Solver::new(polys, source, config).unwrap();
        let listener = Point3::new(7.0, 5.0, 1.0);

        let first = solver.get_paths(listener).len();
        let second = solver.get_paths(listener).len();
        assert_eq!(first, second);
    }

    #[test]
    fn leaf_node_count_matches_max_order_zero() {
        let polys = shoebox(10.0, 8.0, 3.0);
        let source = Point3::new(5.0, 4.0, 1.5);
        let config = SolverConfig::new().with_max_reflection_order(0);
        let solver = Solver::new(polys, source, config).unwrap();
        assert_eq!(solver.leaf_node_count(), 0);
        assert_eq!(solver.max_reflection_order(), 0);
    }

    #[test]
    fn source_position_round_trips() {
        let polys = shoebox(4.0, 4.0, 3.0);
        let source = Point3::new(2.0, 2.0, 1.5);
        let solver = Solver::new(polys, source, SolverConfig::default()).unwrap();
        assert_eq!(solver.source_position(), source);
    }

    #[test]
    fn beams_for_visualization_respects_max_order_filter() {
        let polys = shoebox(10.0, 8.0, 3.0);
        let source = Point3::new(5.0, 4.0, 1.5);
        let config = SolverConfig::new().with_max_reflection_order(2);
        let solver = Solver::new(polys, source, config).unwrap();

        let all = solver.beams_for_visualization(None);
        let first_order_only = solver.beams_for_visualization(Some(1));
        assert!(all.len() >= first_order_only.len());
        assert!(first_order_only.iter().all(|b| b.reflection_order <= 1));
    }
}
