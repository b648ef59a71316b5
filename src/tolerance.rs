//! Shared numerical tolerances for plane, polygon and beam-tree operations.
//!
//! Every epsilon used anywhere in the crate is defined here, rather than
//! scattered as literals through the call sites, so differential testing
//! against a reference implementation only has one place to tune.

/// Tolerance for plane classification (front/back/on-plane) and polygon
/// vertex-on-plane checks.
pub const PLANE_EPSILON: f32 = 1e-6;

/// Below this magnitude, `normal · direction` is treated as "parallel" for
/// ray/plane intersection purposes.
pub const PARALLEL_EPSILON: f32 = 1e-10;

/// Offset applied to ray `t` bounds when casting occlusion rays from a point
/// already lying on a polygon, to avoid re-hitting that polygon immediately.
pub const DISTANCE_EPSILON: f32 = 1e-6;

/// Minimum post-clip aperture area; apertures smaller than this are treated
/// as vanished and pruned during beam-tree construction.
pub const MIN_APERTURE_AREA: f32 = 1e-6;

/// Tolerance used when checking that a polygon's vertices are coplanar
/// (looser than [`PLANE_EPSILON`] since it bounds input geometry, not a
/// derived computation).
pub const COPLANARITY_EPSILON: f32 = 1e-4;

/// Below this skip-sphere radius, a new skip sphere is not worth caching.
pub const MIN_SKIP_SPHERE_RADIUS: f32 = 1e-10;

/// Below this area, a scene polygon passed to [`crate::Solver::new`] is
/// rejected as degenerate rather than silently producing a beam tree with
/// zero-aperture reflectors.
pub const MIN_POLYGON_AREA: f32 = 1e-6;

/// Default speed of sound in air, in metres per second, used to convert a
/// path length into an arrival time.
pub const DEFAULT_SPEED_OF_SOUND: f32 = 343.0;

/// Incidence angle (radians) above which a reflection is flagged as grazing.
pub const DEFAULT_GRAZING_THRESHOLD: f32 = 1.553_343; // ~89 degrees

/// A bundle of the epsilons above, for callers who want to vary them
/// together (e.g. for differential testing against a reference solver)
/// instead of relying on the crate-wide defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub plane_epsilon: f32,
    pub parallel_epsilon: f32,
    pub distance_epsilon: f32,
    pub min_aperture_area: f32,
    pub coplanarity_epsilon: f32,
    pub min_skip_sphere_radius: f32,
    pub grazing_threshold: f32,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            plane_epsilon: PLANE_EPSILON,
            parallel_epsilon: PARALLEL_EPSILON,
            distance_epsilon: DISTANCE_EPSILON,
            min_aperture_area: MIN_APERTURE_AREA,
            coplanarity_epsilon: COPLANARITY_EPSILON,
            min_skip_sphere_radius: MIN_SKIP_SPHERE_RADIUS,
            grazing_threshold: DEFAULT_GRAZING_THRESHOLD,
        }
    }
}
