//! Per-query caches that make interactive listener motion cheap: the
//! fail-plane cache (component C5) and skip-sphere buckets (component C6).

mod bucket;
mod fail_plane;

pub use bucket::{Bucket, SkipSphere};
pub(crate) use fail_plane::compute_fail_plane;
