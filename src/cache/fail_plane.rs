//! Fail-plane detection (spec §4.8): the geometric plane whose negative
//! half-space proves a beam's path is still invalid, cached on the node
//! so the next query can re-test it in O(1).

use nalgebra::Point3;

use crate::beam::{BeamNode, FailPlaneKind};
use crate::plane::Plane3D;
use crate::polygon::Polygon;
use crate::tolerance::Tolerances;

/// Computes the fail plane for a leaf (or intermediate aperture node) that
/// just failed full validation.
///
/// Orients the node's reflecting polygon plane so its virtual source is in
/// front; if the listener is behind, that oriented plane is the cache
/// entry. Otherwise scans the node's boundary planes (edge planes first,
/// then the aperture plane) for the first one that classifies the listener
/// strictly behind.
pub(crate) fn compute_fail_plane(
    node: &BeamNode,
    reflecting_polygon: &Polygon,
    listener: Point3<f32>,
    tol: &Tolerances,
) -> Option<(Plane3D, FailPlaneKind)> {
    let mut oriented = reflecting_polygon.plane();
    if oriented.signed_distance(node.virtual_source()) < 0.0 {
        oriented = oriented.flipped();
    }
    if oriented.signed_distance(listener) < -tol.plane_epsilon {
        return Some((oriented, FailPlaneKind::Polygon));
    }

    let boundary_planes = node.boundary_planes();
    let last_index = boundary_planes.len().saturating_sub(1);
    for (i, plane) in boundary_planes.iter().enumerate() {
        if plane.signed_distance(listener) < -tol.plane_epsilon {
            let kind = if i == last_index {
                FailPlaneKind::Aperture
            } else {
                FailPlaneKind::Edge
            };
            return Some((plane.clone(), kind));
        }
    }

    None
}
