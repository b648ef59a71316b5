//! Plane selection strategies for BSP tree construction.
//!
//! The choice of splitting plane affects tree balance and the number of
//! polygon splits during construction. Different strategies trade off build
//! speed against tree quality.

use crate::plane::Classification;
use crate::polygon::Polygon;

/// Strategy for selecting which polygon's plane to use for splitting.
///
/// Implementations return the index (within the given slice) of the
/// polygon whose plane should split this node, or `None` for an empty slice.
pub trait PlaneSelector {
    fn select(&self, polygons: &[(usize, Polygon)]) -> Option<usize>;
}

/// Selects the first polygon in the list.
///
/// Simplest and fastest selector; tree balance depends entirely on input
/// order. Useful for small, deterministic test scenes.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstPolygon;

impl PlaneSelector for FirstPolygon {
    fn select(&self, polygons: &[(usize, Polygon)]) -> Option<usize> {
        if polygons.is_empty() {
            None
        } else {
            Some(0)
        }
    }
}

/// Samples up to [`Self::SAMPLE_COUNT`] candidate splitters (strided across
/// the input) and picks the one minimizing `8 · splits + |front − back|`,
/// following the heuristic given for BSP construction.
#[derive(Debug, Clone, Copy, Default)]
pub struct BalancedSelector;

impl BalancedSelector {
    /// Maximum number of candidate splitters evaluated per node.
    pub const SAMPLE_COUNT: usize = 10;

    fn cost(&self, candidate_idx: usize, polygons: &[(usize, Polygon)]) -> u32 {
        let plane = polygons[candidate_idx].1.plane();
        let mut splits = 0u32;
        let mut front = 0i64;
        let mut back = 0i64;

        for (i, (_, polygon)) in polygons.iter().enumerate() {
            if i == candidate_idx {
                continue;
            }
            match polygon.classify(&plane) {
                Classification::Front => front += 1,
                Classification::Back => back += 1,
                Classification::Coplanar => {}
                Classification::Spanning => {
                    splits += 1;
                    front += 1;
                    back += 1;
                }
            }
        }

        8 * splits + (front - back).unsigned_abs() as u32
    }
}

impl PlaneSelector for BalancedSelector {
    fn select(&self, polygons: &[(usize, Polygon)]) -> Option<usize> {
        if polygons.is_empty() {
            return None;
        }
        if polygons.len() == 1 {
            return Some(0);
        }

        let stride = (polygons.len() / Self::SAMPLE_COUNT).max(1);
        let candidates: Vec<usize> = (0..polygons.len()).step_by(stride).take(Self::SAMPLE_COUNT).collect();

        candidates
            .into_iter()
            .min_by_key(|&idx| self.cost(idx, polygons))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn make_triangle(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> Polygon {
        Polygon::new(vec![
            Point3::new(a[0], a[1], a[2]),
            Point3::new(b[0], b[1], b[2]),
            Point3::new(c[0], c[1], c[2]),
        ])
    }

    #[test]
    fn first_polygon_empty_list() {
        let selector = FirstPolygon;
        let polygons: Vec<(usize, Polygon)> = vec![];
        assert!(selector.select(&polygons).is_none());
    }

    #[test]
    fn first_polygon_picks_index_zero() {
        let selector = FirstPolygon;
        let poly1 = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let poly2 = make_triangle([0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0]);
        let polygons = vec![(0, poly1), (1, poly2)];
        assert_eq!(selector.select(&polygons), Some(0));
    }

    #[test]
    fn balanced_selector_prefers_centered_plane() {
        let selector = BalancedSelector;
        // Three parallel, non-intersecting triangles stacked along z. The
        // middle one splits the other two evenly (cost 0); either outer one
        // puts both remaining triangles on the same side (cost 2).
        let below = make_triangle([-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [0.0, 1.0, -1.0]);
        let middle = make_triangle([-1.0, -1.0, 0.0], [1.0, -1.0, 0.0], [0.0, 1.0, 0.0]);
        let above = make_triangle([-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [0.0, 1.0, 1.0]);

        let polygons = vec![(0, below), (1, middle), (2, above)];
        let choice = selector.select(&polygons).unwrap();
        assert_eq!(choice, 1);
    }

    #[test]
    fn balanced_selector_single_polygon() {
        let selector = BalancedSelector;
        let poly = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let polygons = vec![(0, poly)];
        assert_eq!(selector.select(&polygons), Some(0));
    }
}
