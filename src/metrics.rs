//! Per-query diagnostics returned by [`crate::Solver::metrics`] (spec §6).

/// Snapshot of solver activity for the most recent [`crate::Solver::get_paths`]
/// or [`crate::Solver::get_detailed_paths`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metrics {
    /// Total number of leaf nodes in the beam tree.
    pub total_leaf_nodes: usize,
    /// Total number of leaf buckets.
    pub buckets_total: usize,
    /// Buckets skipped this query via an active skip sphere.
    pub buckets_skipped: usize,
    /// Buckets whose leaves were individually processed this query.
    pub buckets_checked: usize,
    /// Leaf validations answered from a cached fail plane.
    pub fail_plane_cache_hits: usize,
    /// Leaf validations that required full validation.
    pub fail_plane_cache_misses: usize,
    /// Total BSP/polygon ray casts performed this query.
    pub raycast_count: usize,
    /// Skip spheres created this query.
    pub skip_sphere_count: usize,
    /// Valid paths returned this query.
    pub valid_path_count: usize,
}
