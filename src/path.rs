//! Reflection paths: the listener→leaf validation walk (spec §4.6), the
//! direct-path check (spec §4.7), and the detailed per-segment view
//! returned by [`crate::Solver::get_detailed_paths`] (spec §6).

use nalgebra::{Point3, Vector3};

use crate::beam::BeamTree;
use crate::bsp::BspTree;
use crate::polygon::Polygon;
use crate::tolerance::{Tolerances, DEFAULT_SPEED_OF_SOUND};

/// One point along a reflection path.
///
/// The first and last point of a path (listener and source) carry
/// `polygon_id: None`; every interior point is a reflection off
/// `polygon_id`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathPoint {
    pub position: Point3<f32>,
    pub polygon_id: Option<usize>,
}

/// An ordered, validated, unoccluded specular path from listener to
/// source: `listener → p₁ → p₂ → … → p_k → source`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReflectionPath {
    points: Vec<PathPoint>,
}

impl ReflectionPath {
    /// All points of the path, listener first and source last.
    #[inline]
    pub fn points(&self) -> &[PathPoint] {
        &self.points
    }

    /// Number of reflections (interior points). Order 0 is a direct path.
    pub fn reflection_order(&self) -> usize {
        self.points.len().saturating_sub(2)
    }

    /// Sum of consecutive segment lengths.
    pub fn total_length(&self) -> f32 {
        self.points
            .windows(2)
            .map(|w| (w[1].position - w[0].position).norm())
            .sum()
    }

    /// Arrival time at the listener for a given speed of sound (m/s).
    pub fn arrival_time_with_speed(&self, speed_of_sound: f32) -> f32 {
        self.total_length() / speed_of_sound
    }

    /// Arrival time using the default speed of sound (343 m/s).
    pub fn arrival_time(&self) -> f32 {
        self.arrival_time_with_speed(DEFAULT_SPEED_OF_SOUND)
    }
}

/// One segment of a [`DetailedPath`]: a straight hop between two
/// consecutive path points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetailedSegment {
    pub start: Point3<f32>,
    pub end: Point3<f32>,
    pub length: f32,
    /// Distance travelled from the listener up to and including `end`.
    pub cumulative_distance: f32,
}

/// One reflection of a [`DetailedPath`], enriched with incidence geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetailedReflection {
    pub position: Point3<f32>,
    pub polygon_id: usize,
    /// Angle between the incoming ray and the surface normal, radians.
    pub incidence_angle: f32,
    /// Angle between the outgoing ray and the surface normal, radians.
    pub reflection_angle: f32,
    /// Unit direction the ray travels arriving at this point.
    pub incoming: Vector3<f32>,
    /// Unit direction the ray travels leaving this point.
    pub outgoing: Vector3<f32>,
    /// Surface unit normal, oriented toward the incoming ray.
    pub normal: Vector3<f32>,
    /// `true` when `incidence_angle` exceeds the grazing threshold (~89°).
    pub is_grazing: bool,
}

/// A [`ReflectionPath`] enriched with per-segment and per-reflection
/// geometric detail (spec §6's `getDetailedPaths`).
#[derive(Debug, Clone, PartialEq)]
pub struct DetailedPath {
    pub segments: Vec<DetailedSegment>,
    pub reflections: Vec<DetailedReflection>,
    pub total_length: f32,
}

impl DetailedPath {
    /// Arrival time at the listener for a given speed of sound (m/s).
    pub fn arrival_time_with_speed(&self, speed_of_sound: f32) -> f32 {
        self.total_length / speed_of_sound
    }

    /// Arrival time using the default speed of sound (343 m/s).
    pub fn arrival_time(&self) -> f32 {
        self.arrival_time_with_speed(DEFAULT_SPEED_OF_SOUND)
    }

    /// Derives a detailed view from a validated [`ReflectionPath`].
    pub fn from_path(path: &ReflectionPath, polygons: &[Polygon], tol: &Tolerances) -> Self {
        let points = path.points();

        let mut segments = Vec::with_capacity(points.len().saturating_sub(1));
        let mut cumulative = 0.0f32;
        for w in points.windows(2) {
            let start = w[0].position;
            let end = w[1].position;
            let length = (end - start).norm();
            cumulative += length;
            segments.push(DetailedSegment {
                start,
                end,
                length,
                cumulative_distance: cumulative,
            });
        }
        let total_length = cumulative;

        let mut reflections = Vec::with_capacity(points.len().saturating_sub(2));
        for i in 1..points.len().saturating_sub(1) {
            let prev = points[i - 1].position;
            let curr = points[i].position;
            let next = points[i + 1].position;
            let polygon_id = points[i]
                .polygon_id
                .expect("interior path point must carry a polygon id");

            let incoming = (curr - prev).normalize();
            let outgoing = (next - curr).normalize();
            let mut normal = polygons[polygon_id].unit_normal().unwrap_or(Vector3::zeros());
            if normal.dot(&incoming) > 0.0 {
                normal = -normal;
            }

            let incidence_angle = (-incoming).dot(&normal).clamp(-1.0, 1.0).acos();
            let reflection_angle = outgoing.dot(&normal).clamp(-1.0, 1.0).acos();
            let is_grazing = incidence_angle > tol.grazing_threshold;

            reflections.push(DetailedReflection {
                position: curr,
                polygon_id,
                incidence_angle,
                reflection_angle,
                incoming,
                outgoing,
                normal,
                is_grazing,
            });
        }

        Self {
            segments,
            reflections,
            total_length,
        }
    }
}

/// Order-0 direct path check (spec §4.7): a single BSP ray from listener
/// to source, rejected if anything hits strictly before the source.
pub(crate) fn try_direct_path(
    bsp: &BspTree,
    listener: Point3<f32>,
    source: Point3<f32>,
    tol: &Tolerances,
    raycast_count: &mut usize,
) -> Option<ReflectionPath> {
    let delta = source - listener;
    let dist = delta.norm();
    let points = vec![
        PathPoint {
            position: listener,
            polygon_id: None,
        },
        PathPoint {
            position: source,
            polygon_id: None,
        },
    ];

    if dist < tol.plane_epsilon {
        return Some(ReflectionPath { points });
    }

    let dir = delta / dist;
    *raycast_count += 1;
    let blocked = bsp
        .ray_trace(listener, dir, tol.distance_epsilon, dist - tol.distance_epsilon, None)
        .is_some();

    if blocked {
        None
    } else {
        Some(ReflectionPath { points })
    }
}

/// Listener→leaf validation walk (spec §4.6). `node_idx` may be any node
/// in the beam tree with a non-`None` reflecting id (a leaf, for the
/// bucketed sweep, or a non-leaf aperture node, for intermediate-order
/// paths per §4.7).
pub(crate) fn validate_path(
    beam_tree: &BeamTree,
    bsp: &BspTree,
    polygons: &[Polygon],
    node_idx: usize,
    listener: Point3<f32>,
    source: Point3<f32>,
    tol: &Tolerances,
    raycast_count: &mut usize,
) -> Option<ReflectionPath> {
    let mut current_point = listener;
    let mut current_node_idx = Some(node_idx);
    let mut prev_poly_id: Option<usize> = None;
    let mut reflections: Vec<PathPoint> = Vec::new();

    while let Some(idx) = current_node_idx {
        let node = beam_tree.node(idx);
        let Some(reflecting_id) = node.reflecting_id() else {
            break;
        };

        let delta = node.virtual_source() - current_point;
        let dist = delta.norm();
        if dist < tol.plane_epsilon {
            return None;
        }
        let dir = delta / dist;

        let polygon = &polygons[reflecting_id];
        let (hit_t, hit_point) = polygon.ray_intersect(current_point, dir)?;
        if hit_t < 0.0 {
            return None;
        }

        *raycast_count += 1;
        let occluded = bsp
            .ray_trace(
                current_point,
                dir,
                tol.distance_epsilon,
                hit_t - tol.distance_epsilon,
                prev_poly_id,
            )
            .is_some();
        if occluded {
            return None;
        }

        reflections.push(PathPoint {
            position: hit_point,
            polygon_id: Some(reflecting_id),
        });
        current_point = hit_point;
        prev_poly_id = Some(reflecting_id);
        current_node_idx = node.parent();
    }

    let delta = source - current_point;
    let dist = delta.norm();
    if dist >= tol.plane_epsilon {
        let dir = delta / dist;
        *raycast_count += 1;
        let occluded = bsp
            .ray_trace(
                current_point,
                dir,
                tol.distance_epsilon,
                dist - tol.distance_epsilon,
                prev_poly_id,
            )
            .is_some();
        if occluded {
            return None;
        }
    }

    let mut points = Vec::with_capacity(reflections.len() + 2);
    points.push(PathPoint {
        position: listener,
        polygon_id: None,
    });
    points.extend(reflections);
    points.push(PathPoint {
        position: source,
        polygon_id: None,
    });

    Some(ReflectionPath { points })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bsp::{BspTree, FirstPolygon};

    fn square(z: f32) -> Polygon {
        Polygon::new(vec![
            Point3::new(-5.0, -5.0, z),
            Point3::new(5.0, -5.0, z),
            Point3::new(5.0, 5.0, z),
            Point3::new(-5.0, 5.0, z),
        ])
    }

    #[test]
    fn direct_path_with_empty_scene_is_valid() {
        let bsp = BspTree::new();
        let tol = Tolerances::default();
        let mut count = 0;
        let path = try_direct_path(
            &bsp,
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(3.0, 4.0, 0.0),
            &tol,
            &mut count,
        )
        .unwrap();
        assert_eq!(path.reflection_order(), 0);
        assert!((path.total_length() - 5.0).abs() < 1e-4);
        assert_eq!(count, 1);
    }

    #[test]
    fn direct_path_blocked_by_intervening_polygon() {
        let blocker = square(0.0);
        let bsp = BspTree::from_polygons(&[blocker], &FirstPolygon);
        let tol = Tolerances::default();
        let mut count = 0;
        let path = try_direct_path(
            &bsp,
            Point3::new(0.0, 0.0, -2.0),
            Point3::new(0.0, 0.0, 2.0),
            &tol,
            &mut count,
        );
        assert!(path.is_none());
    }

    #[test]
    fn direct_path_listener_equals_source() {
        let bsp = BspTree::new();
        let tol = Tolerances::default();
        let mut count = 0;
        let p = Point3::new(1.0, 1.0, 1.0);
        let path = try_direct_path(&bsp, p, p, &tol, &mut count).unwrap();
        assert!((path.total_length()).abs() < 1e-5);
    }

    #[test]
    fn reflection_order_counts_interior_points() {
        let path = ReflectionPath {
            points: vec![
                PathPoint {
                    position: Point3::origin(),
                    polygon_id: None,
                },
                PathPoint {
                    position: Point3::new(1.0, 0.0, 0.0),
                    polygon_id: Some(0),
                },
                PathPoint {
                    position: Point3::new(2.0, 0.0, 0.0),
                    polygon_id: Some(1),
                },
                PathPoint {
                    position: Point3::new(3.0, 0.0, 0.0),
                    polygon_id: None,
                },
            ],
        };
        assert_eq!(path.reflection_order(), 2);
        assert!((path.total_length() - 3.0).abs() < 1e-5);
    }
}
