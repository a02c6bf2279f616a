//! Contour extraction from skeleton rasters.
//!
//! Two extractors implement [`ContourExtractor`]:
//! - [`BorderFollowing`]: Suzuki–Abe border following. Every border is
//!   reported (no hierarchy filtering, no point approximation). On a
//!   one-pixel-wide skeleton the outer border walks both sides of the curve,
//!   so an open arc appears as an out-and-back polyline.
//! - [`SkeletonChains`]: junction-aware chain tracing. Pixels with degree
//!   `!= 2` are nodes; runs of degree-2 pixels between nodes become
//!   [`ContourKind::Chain`] polylines and node-free cycles become
//!   [`ContourKind::Loop`] polylines that end on their first point.
//!
//! [`select_centerline`] then picks the contour with the longest open arc
//! length as the main track path.

mod border;
mod chains;
mod contour;

pub use border::BorderFollowing;
pub use chains::{Connectivity, SkeletonChains, trace_skeleton_chains};
pub use contour::{Contour, ContourExtractor, ContourKind, ContourMethod, select_centerline};
