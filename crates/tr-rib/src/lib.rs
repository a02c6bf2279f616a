//! Track cross-section ("rib") extraction.
//!
//! Given a binary track mask and a centerline contour, ribs are sampled at a
//! fixed index stride along the contour. At each sample:
//! - the tangent is a windowed finite difference over the contour points;
//! - a ray is marched along the perpendicular (tangent + 90 degrees) in both
//!   signed directions over the mask, one unit step at a time;
//! - each half-ray stops at the last track pixel before background, before
//!   leaving the raster, or at `max_length`.
//!
//! ## Discretization
//! The pixel under a real ray position is found by truncating toward zero,
//! not rounding, and all ray math is `f64`. A half-ray that hits background
//! or the raster edge at step `k` reports the position of step `k - 1`; a
//! half-ray that hits nothing is cut at the first whole step `>= max_length`
//! and flagged [`RayStop::MaxLength`]. Zero-length halves are valid.

mod extract;
mod ray;
mod render;
mod stats;
mod tangent;

pub use extract::{
    RibConfig, RibSegment, SamplingMode, SkeletonRibs, extract_ribs, extract_ribs_from_skeleton,
    rib_at, ribs_from_skeleton, sample_indices,
};
pub use ray::{RAY_STEP, RayHit, RayStop, cast_ray, march};
pub use render::{RIB_COLOR, render_ribs, render_ribs_mut};
pub use stats::RibStats;
pub use tangent::{DEFAULT_TANGENT_WINDOW, perpendicular, tangent_angle};
