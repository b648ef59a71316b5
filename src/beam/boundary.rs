//! Construction of a beam node's boundary planes (spec §4.5).

use nalgebra::Point3;

use crate::plane::Plane3D;
use crate::polygon::Polygon;

/// Builds the boundary planes of the cone from `virtual_source` through
/// `aperture`: one plane per aperture edge, through the virtual source and
/// the edge's two endpoints, flipped so the aperture's centroid lies on
/// its positive side; plus the aperture's own plane, flipped so the
/// virtual source lies on its negative side.
///
/// Invariant: a point is inside the beam iff every returned plane
/// evaluates to a signed distance `>= -epsilon`.
pub fn build_boundary_planes(virtual_source: Point3<f32>, aperture: &Polygon) -> Vec<Plane3D> {
    let centroid = aperture.centroid();
    let vertices = aperture.vertices();
    let n = vertices.len();

    let mut planes = Vec::with_capacity(n + 1);
    for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        let mut plane = Plane3D::from_three_points(virtual_source, a, b);
        if plane.signed_distance(centroid) < 0.0 {
            plane = plane.flipped();
        }
        planes.push(plane);
    }

    let mut aperture_plane = aperture.plane();
    if aperture_plane.signed_distance(virtual_source) > 0.0 {
        aperture_plane = aperture_plane.flipped();
    }
    planes.push(aperture_plane);

    planes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(z: f32) -> Polygon {
        Polygon::new(vec![
            Point3::new(-1.0, -1.0, z),
            Point3::new(1.0, -1.0, z),
            Point3::new(1.0, 1.0, z),
            Point3::new(-1.0, 1.0, z),
        ])
    }

    #[test]
    fn centroid_is_inside_every_edge_plane() {
        let aperture = square(0.0);
        let vs = Point3::new(0.0, 0.0, 5.0);
        let planes = build_boundary_planes(vs, &aperture);
        for plane in &planes[..planes.len() - 1] {
            assert!(plane.signed_distance(aperture.centroid()) >= -1e-5);
        }
    }

    #[test]
    fn virtual_source_is_behind_aperture_plane() {
        let aperture = square(0.0);
        let vs = Point3::new(0.0, 0.0, 5.0);
        let planes = build_boundary_planes(vs, &aperture);
        let aperture_plane = planes.last().unwrap();
        assert!(aperture_plane.signed_distance(vs) <= 1e-5);
    }

    #[test]
    fn point_beyond_aperture_on_axis_is_inside_cone() {
        let aperture = square(0.0);
        let vs = Point3::new(0.0, 0.0, 5.0);
        let planes = build_boundary_planes(vs, &aperture);
        let beyond = Point3::new(0.0, 0.0, -3.0);
        for plane in &planes {
            assert!(plane.signed_distance(beyond) >= -1e-4);
        }
    }

    #[test]
    fn point_outside_edge_cone_is_rejected() {
        let aperture = square(0.0);
        let vs = Point3::new(0.0, 0.0, 5.0);
        let planes = build_boundary_planes(vs, &aperture);
        let outside = Point3::new(10.0, 10.0, 0.0);
        assert!(planes.iter().any(|p| p.signed_distance(outside) < -1e-4));
    }

    #[test]
    fn boundary_plane_count_matches_edges_plus_one() {
        let aperture = square(0.0);
        let vs = Point3::new(0.0, 0.0, 5.0);
        let planes = build_boundary_planes(vs, &aperture);
        assert_eq!(planes.len(), aperture.vertices().len() + 1);
    }
}
