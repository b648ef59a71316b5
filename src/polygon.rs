//! Convex polygon representation, plane membership and ray queries.

use nalgebra::{Point3, Vector3};

use crate::plane::{Classification, Plane3D, PlaneSide};
use crate::tolerance::{COPLANARITY_EPSILON, MIN_APERTURE_AREA, PLANE_EPSILON};

/// A convex polygon in 3D space, defined by an ordered list of vertices.
///
/// Vertices must be coplanar and in counter-clockwise winding order when
/// viewed from the front (the direction the normal points). An optional
/// material tag is carried through but never interpreted by this crate.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point3<f32>>,
    material: Option<String>,
}

impl Polygon {
    /// Creates a new polygon from a list of vertices.
    ///
    /// # Panics (debug builds only)
    /// - Panics if fewer than 3 vertices are provided.
    /// - Panics if vertices are not coplanar.
    pub fn new(vertices: Vec<Point3<f32>>) -> Self {
        debug_assert!(
            vertices.len() >= 3,
            "Polygon must have at least 3 vertices"
        );
        debug_assert!(
            Self::are_coplanar(&vertices),
            "Polygon vertices must be coplanar"
        );
        Self {
            vertices,
            material: None,
        }
    }

    /// Attaches a material tag, returning `self` for chaining.
    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = Some(material.into());
        self
    }

    /// Returns the polygon's material tag, if any.
    #[inline]
    pub fn material(&self) -> Option<&str> {
        self.material.as_deref()
    }

    /// Checks if all vertices lie on the same plane, within [`COPLANARITY_EPSILON`].
    fn are_coplanar(vertices: &[Point3<f32>]) -> bool {
        if vertices.len() <= 3 {
            return true;
        }
        let plane = Plane3D::from_three_points(vertices[0], vertices[1], vertices[2]);
        vertices[3..]
            .iter()
            .all(|v| plane.signed_distance(*v).abs() < COPLANARITY_EPSILON)
    }

    /// Largest absolute signed distance of any vertex to the plane defined
    /// by the first three vertices; used by construction-time validation to
    /// report [`crate::GeometryError::NonCoplanarVertices`] with a precise
    /// deviation instead of a bare assertion failure.
    pub fn max_planar_deviation(&self) -> f32 {
        if self.vertices.len() <= 3 {
            return 0.0;
        }
        let plane = Plane3D::from_three_points(self.vertices[0], self.vertices[1], self.vertices[2]);
        self.vertices[3..]
            .iter()
            .map(|v| plane.signed_distance(*v).abs())
            .fold(0.0f32, f32::max)
    }

    /// Returns the vertices of the polygon.
    #[inline]
    pub fn vertices(&self) -> &[Point3<f32>] {
        &self.vertices
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Returns true if the polygon has no vertices (always false for valid polygons).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Computes the (unnormalized) normal vector of the polygon.
    ///
    /// Uses the first three vertices to compute the normal via cross product.
    pub fn normal(&self) -> Vector3<f32> {
        let a = &self.vertices[0];
        let b = &self.vertices[1];
        let c = &self.vertices[2];
        let ab = b - a;
        let ac = c - a;
        ab.cross(&ac)
    }

    /// Computes the unit normal vector of the polygon.
    ///
    /// Returns `None` if the first three vertices are collinear.
    pub fn unit_normal(&self) -> Option<Vector3<f32>> {
        let n = self.normal();
        let len = n.norm();
        if len > f32::EPSILON {
            Some(n / len)
        } else {
            None
        }
    }

    /// Returns the plane that this polygon lies on.
    ///
    /// # Panics
    /// Panics if the first three vertices are collinear.
    pub fn plane(&self) -> Plane3D {
        Plane3D::from_three_points(self.vertices[0], self.vertices[1], self.vertices[2])
    }

    /// Computes the centroid (center of mass) of the polygon's vertices.
    pub fn centroid(&self) -> Point3<f32> {
        let sum: Vector3<f32> = self.vertices.iter().map(|p| p.coords).sum();
        Point3::from(sum / self.vertices.len() as f32)
    }

    /// Computes the area of the (assumed convex, planar) polygon by fan
    /// triangulation from the first vertex.
    pub fn area(&self) -> f32 {
        if self.vertices.len() < 3 {
            return 0.0;
        }
        let v0 = self.vertices[0];
        let mut sum = Vector3::zeros();
        for i in 1..self.vertices.len() - 1 {
            let a = self.vertices[i] - v0;
            let b = self.vertices[i + 1] - v0;
            sum += a.cross(&b);
        }
        sum.norm() * 0.5
    }

    /// Classifies this polygon relative to a plane.
    pub fn classify(&self, plane: &Plane3D) -> Classification {
        self.classify_with_epsilon(plane, PLANE_EPSILON)
    }

    /// Classifies this polygon relative to a plane, with a custom epsilon.
    pub fn classify_with_epsilon(&self, plane: &Plane3D, epsilon: f32) -> Classification {
        let mut front = 0;
        let mut back = 0;
        let mut on_plane = 0;

        for vertex in &self.vertices {
            match plane.classify_point_with_epsilon(*vertex, epsilon) {
                PlaneSide::Front => front += 1,
                PlaneSide::Back => back += 1,
                PlaneSide::OnPlane => on_plane += 1,
            }
        }

        if on_plane == self.vertices.len() {
            Classification::Coplanar
        } else if back == 0 {
            Classification::Front
        } else if front == 0 {
            Classification::Back
        } else {
            Classification::Spanning
        }
    }

    /// Returns `true` if every vertex is (strictly) behind some single plane
    /// in `planes` — a cheap rejection test before attempting a full clip.
    pub fn is_outside_planes(&self, planes: &[Plane3D]) -> bool {
        planes.iter().any(|plane| {
            self.vertices
                .iter()
                .all(|v| plane.signed_distance(*v) < -PLANE_EPSILON)
        })
    }

    /// Clips this polygon against a convex list of half-spaces
    /// (Sutherland–Hodgman), keeping the intersection of all "front or on"
    /// half-spaces. Returns `None` if the result is empty or degenerate.
    pub fn clip_by_planes(&self, planes: &[Plane3D]) -> Option<Polygon> {
        let mut current = self.vertices.clone();

        for plane in planes {
            if current.len() < 3 {
                return None;
            }
            current = clip_half_space(&current, plane);
        }

        if current.len() < 3 {
            None
        } else {
            Some(Polygon {
                vertices: current,
                material: self.material.clone(),
            })
        }
    }

    /// Tests whether a point known to lie on this polygon's plane is inside
    /// its boundary, via the consistent-sign cross-product rule.
    pub fn contains_point(&self, point: Point3<f32>) -> bool {
        let normal = self.normal();
        let n = self.vertices.len();
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            let edge = b - a;
            let to_point = point - a;
            let cross = edge.cross(&to_point);
            if cross.dot(&normal) < -PLANE_EPSILON {
                return false;
            }
        }
        true
    }

    /// Intersects a ray (`origin + t·dir`, any real `t`) with this polygon.
    ///
    /// Returns `Some((t, point))` only if the ray hits the polygon's plane
    /// *and* the hit point lies within the polygon's boundary. Callers are
    /// responsible for rejecting `t` outside of a desired `[t_min, t_max]`.
    pub fn ray_intersect(&self, origin: Point3<f32>, dir: Vector3<f32>) -> Option<(f32, Point3<f32>)> {
        let plane = self.plane();
        let (t, point) = plane.intersect_ray(origin, dir)?;
        if self.contains_point(point) {
            Some((t, point))
        } else {
            None
        }
    }

    /// Convenience check for the minimum-aperture-area pruning rule used
    /// during beam-tree construction.
    pub fn is_negligible_area(&self) -> bool {
        self.area() < MIN_APERTURE_AREA
    }
}

/// Walks the edges of `vertices` and keeps only the portion on the front (or
/// on-plane) side of `plane`, inserting interpolated crossing points where an
/// edge straddles the plane. Standard Sutherland–Hodgman single-plane clip.
fn clip_half_space(vertices: &[Point3<f32>], plane: &Plane3D) -> Vec<Point3<f32>> {
    let n = vertices.len();
    let mut output = Vec::with_capacity(n + 1);

    for i in 0..n {
        let current = vertices[i];
        let next = vertices[(i + 1) % n];
        let current_side = plane.classify_point(current);
        let next_side = plane.classify_point(next);

        let current_inside = !matches!(current_side, PlaneSide::Back);
        let next_inside = !matches!(next_side, PlaneSide::Back);

        if current_inside {
            output.push(current);
        }

        if current_inside != next_inside {
            if let Some((_, intersection)) = plane.intersect_segment(current, next) {
                output.push(intersection);
            }
        }
    }

    output
}

impl From<Polygon> for Plane3D {
    fn from(polygon: Polygon) -> Self {
        polygon.plane()
    }
}

impl From<&Polygon> for Plane3D {
    fn from(polygon: &Polygon) -> Self {
        polygon.plane()
    }
}
