//! Skip-sphere bucket cache (spec §4.9 / component C6).

use std::ops::Range;

use nalgebra::Point3;

/// A listener-centred sphere inside which every leaf in a bucket is
/// guaranteed to still fail validation.
///
/// Correctness (spec §4.9): the radius is the minimum, over the bucket's
/// members, of `|signedDistance(listener, member.failPlane)|` at the
/// moment the sphere was created. As long as the listener stays within
/// that radius of the sphere's center, every member's fail plane still
/// classifies it strictly behind, so every member path is still invalid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkipSphere {
    pub center: Point3<f32>,
    pub radius: f32,
}

impl SkipSphere {
    /// `true` if `listener` lies strictly inside the sphere.
    pub fn contains(&self, listener: Point3<f32>) -> bool {
        (listener - self.center).norm() < self.radius
    }
}

/// A contiguous group of leaf beam nodes (referenced by index range into
/// [`crate::beam::BeamTree::leaves`]), with an optional cached skip sphere.
#[derive(Debug, Clone)]
pub struct Bucket {
    id: usize,
    leaf_range: Range<usize>,
    skip_sphere: Option<SkipSphere>,
}

impl Bucket {
    fn new(id: usize, leaf_range: Range<usize>) -> Self {
        Self {
            id,
            leaf_range,
            skip_sphere: None,
        }
    }

    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    #[inline]
    pub fn leaf_range(&self) -> Range<usize> {
        self.leaf_range.clone()
    }

    #[inline]
    pub fn skip_sphere(&self) -> Option<&SkipSphere> {
        self.skip_sphere.as_ref()
    }

    pub fn set_skip_sphere(&mut self, sphere: Option<SkipSphere>) {
        self.skip_sphere = sphere;
    }

    /// Partitions `leaf_count` leaves into contiguous buckets of
    /// `bucket_size` (the final bucket may be smaller).
    pub fn partition(leaf_count: usize, bucket_size: usize) -> Vec<Bucket> {
        let mut buckets = Vec::new();
        let mut start = 0;
        let mut id = 0;
        while start < leaf_count {
            let end = (start + bucket_size).min(leaf_count);
            buckets.push(Bucket::new(id, start..end));
            start = end;
            id += 1;
        }
        buckets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_splits_into_fixed_size_buckets() {
        let buckets = Bucket::partition(35, 16);
        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets[0].leaf_range(), 0..16);
        assert_eq!(buckets[1].leaf_range(), 16..32);
        assert_eq!(buckets[2].leaf_range(), 32..35);
    }

    #[test]
    fn partition_empty_leaves_yields_no_buckets() {
        assert!(Bucket::partition(0, 16).is_empty());
    }

    #[test]
    fn partition_exact_multiple_has_no_short_bucket() {
        let buckets = Bucket::partition(32, 16);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[1].leaf_range(), 16..32);
    }

    #[test]
    fn skip_sphere_contains_checks_strict_inequality() {
        let sphere = SkipSphere {
            center: Point3::origin(),
            radius: 2.0,
        };
        assert!(sphere.contains(Point3::new(1.0, 0.0, 0.0)));
        assert!(!sphere.contains(Point3::new(2.0, 0.0, 0.0)));
        assert!(!sphere.contains(Point3::new(3.0, 0.0, 0.0)));
    }
}
