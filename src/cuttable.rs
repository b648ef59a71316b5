//! Polygon cutting/splitting operations for BSP construction.

use crate::plane::{Classification, Plane3D, PlaneSide};
use crate::polygon::Polygon;

/// Trait for geometry that can be cut by a plane.
pub trait Cuttable {
    /// Cuts the geometry by a plane.
    ///
    /// Returns `(front, back)` where:
    /// - `front`: `Some(polygon)` containing the part on the front side of the plane
    /// - `back`: `Some(polygon)` containing the part on the back side of the plane
    ///
    /// # Return values by classification
    ///
    /// - **Front**: `(Some(self), None)` - entire geometry is in front
    /// - **Back**: `(None, Some(self))` - entire geometry is behind
    /// - **Coplanar**: `(Some(self), None)` - treated as front
    /// - **Spanning**: `(Some(front_part), Some(back_part))` - split into two pieces
    fn cut(&self, plane: &Plane3D) -> (Option<Polygon>, Option<Polygon>);
}

impl Cuttable for Polygon {
    fn cut(&self, plane: &Plane3D) -> (Option<Polygon>, Option<Polygon>) {
        match self.classify(plane) {
            Classification::Front | Classification::Coplanar => (Some(self.clone()), None),
            Classification::Back => (None, Some(self.clone())),
            Classification::Spanning => split_polygon(self, plane),
        }
    }
}

/// Splits a spanning polygon into front and back parts.
///
/// Walks the polygon edges, building two vertex lists and inserting the
/// interpolated crossing point whenever an edge straddles the plane
/// (`t = −sd(a) / (sd(b) − sd(a))`, implicit in [`Plane3D::intersect_segment`]).
fn split_polygon(polygon: &Polygon, plane: &Plane3D) -> (Option<Polygon>, Option<Polygon>) {
    let vertices = polygon.vertices();
    let n = vertices.len();

    let mut front_verts = Vec::with_capacity(n + 1);
    let mut back_verts = Vec::with_capacity(n + 1);

    let sides: Vec<PlaneSide> = vertices.iter().map(|v| plane.classify_point(*v)).collect();

    for i in 0..n {
        let current = vertices[i];
        let current_side = sides[i];
        let next_idx = (i + 1) % n;
        let next = vertices[next_idx];
        let next_side = sides[next_idx];

        match current_side {
            PlaneSide::Front => front_verts.push(current),
            PlaneSide::Back => back_verts.push(current),
            PlaneSide::OnPlane => {
                front_verts.push(current);
                back_verts.push(current);
            }
        }

        let crosses = matches!(
            (current_side, next_side),
            (PlaneSide::Front, PlaneSide::Back) | (PlaneSide::Back, PlaneSide::Front)
        );

        if crosses {
            if let Some((_, intersection)) = plane.intersect_segment(current, next) {
                front_verts.push(intersection);
                back_verts.push(intersection);
            }
        }
    }

    let material = polygon.material().map(str::to_owned);

    let front = if front_verts.len() >= 3 {
        let mut p = Polygon::new(front_verts);
        if let Some(m) = &material {
            p = p.with_material(m.clone());
        }
        Some(p)
    } else {
        None
    };

    let back = if back_verts.len() >= 3 {
        let mut p = Polygon::new(back_verts);
        if let Some(m) = &material {
            p = p.with_material(m.clone());
        }
        Some(p)
    } else {
        None
    };

    (front, back)
}
