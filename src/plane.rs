//! Plane representation and operations for BSP and beam-tree geometry.

use nalgebra::{Point3, Vector3};

use crate::tolerance::{PARALLEL_EPSILON, PLANE_EPSILON};

/// Which side of a plane a point lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    /// Point is in front of the plane (positive side of normal)
    Front,
    /// Point is behind the plane (negative side of normal)
    Back,
    /// Point lies on the plane (within epsilon tolerance)
    OnPlane,
}

/// Classification of geometry (a polygon) relative to a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// All vertices are in front of the plane
    Front,
    /// All vertices are behind the plane
    Back,
    /// All vertices are on the plane (coplanar)
    Coplanar,
    /// Vertices are on both sides (spans the plane)
    Spanning,
}

/// A plane in 3D space, represented as `normal · point = offset`.
///
/// The invariant `|‖normal‖ − 1| < 1e-6` is maintained by every constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane3D {
    normal: Vector3<f32>,
    offset: f32,
}

impl Plane3D {
    /// Creates a new plane from a normal vector and offset.
    /// The normal will be normalized automatically.
    ///
    /// # Panics
    /// Panics if the normal vector has zero length.
    pub fn new(normal: Vector3<f32>, offset: f32) -> Self {
        let norm = normal.norm();
        assert!(norm > f32::EPSILON, "Plane normal cannot be zero");
        Self {
            normal: normal / norm,
            offset: offset / norm,
        }
    }

    /// Creates a plane from a point on the plane and a normal vector.
    /// The normal will be normalized automatically.
    ///
    /// # Panics
    /// Panics if the normal vector has zero length.
    pub fn from_point_and_normal(point: Point3<f32>, normal: Vector3<f32>) -> Self {
        let norm = normal.norm();
        assert!(norm > f32::EPSILON, "Plane normal cannot be zero");
        let unit_normal = normal / norm;
        let offset = unit_normal.dot(&point.coords);
        Self {
            normal: unit_normal,
            offset,
        }
    }

    /// Creates a plane from three non-collinear points.
    /// The normal direction follows the right-hand rule: (b - a) × (c - a).
    ///
    /// # Panics
    /// Panics if the points are collinear (or nearly so).
    pub fn from_three_points(a: Point3<f32>, b: Point3<f32>, c: Point3<f32>) -> Self {
        let ab = b - a;
        let ac = c - a;
        let normal = ab.cross(&ac);
        Self::from_point_and_normal(a, normal)
    }

    /// Returns the unit normal vector of the plane.
    #[inline]
    pub fn normal(&self) -> Vector3<f32> {
        self.normal
    }

    /// Returns the signed distance from the origin to the plane along the normal.
    #[inline]
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Computes the signed distance from a point to the plane.
    /// - Positive: point is in front (same side as normal)
    /// - Negative: point is behind (opposite side from normal)
    /// - Zero: point is on the plane
    #[inline]
    pub fn signed_distance(&self, point: Point3<f32>) -> f32 {
        self.normal.dot(&point.coords) - self.offset
    }

    /// Classifies which side of the plane a point lies on.
    /// Uses the default [`PLANE_EPSILON`] tolerance.
    #[inline]
    pub fn classify_point(&self, point: Point3<f32>) -> PlaneSide {
        self.classify_point_with_epsilon(point, PLANE_EPSILON)
    }

    /// Classifies which side of the plane a point lies on, with a custom epsilon.
    pub fn classify_point_with_epsilon(&self, point: Point3<f32>, epsilon: f32) -> PlaneSide {
        let dist = self.signed_distance(point);
        if dist > epsilon {
            PlaneSide::Front
        } else if dist < -epsilon {
            PlaneSide::Back
        } else {
            PlaneSide::OnPlane
        }
    }

    /// Returns a new plane with the normal flipped (facing the opposite direction).
    #[inline]
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            offset: -self.offset,
        }
    }

    /// Projects a point onto the plane (finds the closest point on the plane).
    #[inline]
    pub fn project_point(&self, point: Point3<f32>) -> Point3<f32> {
        point - self.normal * self.signed_distance(point)
    }

    /// Mirrors a point across the plane: `p − 2·sd(p)·n`.
    #[inline]
    pub fn mirror_point(&self, point: Point3<f32>) -> Point3<f32> {
        point - self.normal * (2.0 * self.signed_distance(point))
    }

    /// Reconstructs this plane mirrored across another plane, by mirroring
    /// three non-collinear points of `self` and rebuilding from those images.
    ///
    /// This is the "mirror-plane-across-plane" primitive used (latently) by
    /// fail-plane propagation: it lets a plane attached to a deep beam node
    /// be re-expressed in the coordinate frame of a shallower reflection.
    pub fn mirror_across(&self, mirror: &Plane3D) -> Plane3D {
        // Any point on `self` plus two offsets along an orthonormal basis of
        // the plane give three non-collinear points on `self`.
        let origin = self.normal * self.offset;
        let basis = self.normal.cross(&Vector3::x());
        let u = if basis.norm() > f32::EPSILON {
            basis.normalize()
        } else {
            self.normal.cross(&Vector3::y()).normalize()
        };
        let v = self.normal.cross(&u).normalize();

        let p0 = Point3::from(origin);
        let p1 = Point3::from(origin + u);
        let p2 = Point3::from(origin + v);

        let m0 = mirror.mirror_point(p0);
        let m1 = mirror.mirror_point(p1);
        let m2 = mirror.mirror_point(p2);

        Plane3D::from_three_points(m0, m1, m2)
    }

    /// Computes the intersection of a line segment with the plane.
    ///
    /// Returns `Some((t, point))` where:
    /// - `t` is the interpolation parameter (0.0 = start, 1.0 = end)
    /// - `point` is the intersection point
    ///
    /// Returns `None` if the segment is parallel to the plane or doesn't intersect.
    pub fn intersect_segment(
        &self,
        start: Point3<f32>,
        end: Point3<f32>,
    ) -> Option<(f32, Point3<f32>)> {
        let direction = end - start;
        let denom = self.normal.dot(&direction);

        if denom.abs() < f32::EPSILON {
            return None;
        }

        let t = (self.offset - self.normal.dot(&start.coords)) / denom;

        if t < 0.0 || t > 1.0 {
            return None;
        }

        let point = start + direction * t;
        Some((t, point))
    }

    /// Computes the intersection of an (unbounded) ray with the plane.
    ///
    /// Returns `Some((t, point))` with `point = origin + t * dir`, for any
    /// real `t` (including negative). Returns `None` when the ray direction
    /// is (near-)parallel to the plane, i.e. `|normal · dir| < `
    /// [`PARALLEL_EPSILON`].
    pub fn intersect_ray(
        &self,
        origin: Point3<f32>,
        dir: Vector3<f32>,
    ) -> Option<(f32, Point3<f32>)> {
        let denom = self.normal.dot(&dir);
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }
        let t = (self.offset - self.normal.dot(&origin.coords)) / denom;
        Some((t, origin + dir * t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn signed_distance_sign_convention() {
        let plane = Plane3D::new(Vector3::new(0.0, 1.0, 0.0), 0.0);
        assert!(plane.signed_distance(Point3::new(0.0, 1.0, 0.0)) > 0.0);
        assert!(plane.signed_distance(Point3::new(0.0, -1.0, 0.0)) < 0.0);
        assert_abs_diff_eq!(plane.signed_distance(Point3::new(5.0, 0.0, -3.0)), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn flipped_negates_sign() {
        let plane = Plane3D::new(Vector3::new(1.0, 0.0, 0.0), 2.0);
        let flipped = plane.flipped();
        let p = Point3::new(3.0, 0.0, 0.0);
        assert_abs_diff_eq!(
            plane.signed_distance(p) + flipped.signed_distance(p),
            0.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn mirror_point_round_trip() {
        let plane = Plane3D::new(Vector3::new(0.3, 0.7, 0.1), 1.5);
        let p = Point3::new(4.0, -2.0, 1.0);
        let mirrored_once = plane.mirror_point(p);
        let mirrored_twice = plane.mirror_point(mirrored_once);
        assert_abs_diff_eq!((mirrored_twice - p).norm(), 0.0, epsilon = 1e-4);
    }

    #[test]
    fn mirror_point_on_plane_is_fixed() {
        let plane = Plane3D::new(Vector3::new(0.0, 0.0, 1.0), 0.0);
        let on_plane = Point3::new(1.0, 2.0, 0.0);
        let mirrored = plane.mirror_point(on_plane);
        assert_abs_diff_eq!((mirrored - on_plane).norm(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn intersect_ray_parallel_returns_none() {
        let plane = Plane3D::new(Vector3::new(0.0, 1.0, 0.0), 0.0);
        let origin = Point3::new(0.0, 1.0, 0.0);
        let dir = Vector3::new(1.0, 0.0, 0.0);
        assert!(plane.intersect_ray(origin, dir).is_none());
    }

    #[test]
    fn intersect_ray_finds_crossing_with_negative_t() {
        let plane = Plane3D::new(Vector3::new(0.0, 1.0, 0.0), 0.0);
        let origin = Point3::new(0.0, -1.0, 0.0);
        let dir = Vector3::new(0.0, -1.0, 0.0);
        let (t, point) = plane.intersect_ray(origin, dir).unwrap();
        assert!(t < 0.0);
        assert_abs_diff_eq!(point.y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn mirror_across_reconstructs_expected_plane() {
        // Mirroring a horizontal plane (y=2) across a vertical mirror plane (x=0)
        // should leave the plane's orientation and offset unchanged (it's
        // invariant under a mirror orthogonal to it).
        let plane = Plane3D::new(Vector3::new(0.0, 1.0, 0.0), 2.0);
        let mirror = Plane3D::new(Vector3::new(1.0, 0.0, 0.0), 0.0);
        let mirrored = plane.mirror_across(&mirror);

        let probe = Point3::new(0.0, 2.0, 0.0);
        assert_abs_diff_eq!(mirrored.signed_distance(probe), 0.0, epsilon = 1e-4);
    }
}
