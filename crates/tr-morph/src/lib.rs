//! Binary morphology and skeletonization for track masks.
//!
//! Pixels are treated as binary with threshold `> 0`.
//! Outputs are `0` or `255` in `u8`.
//!
//! - [`open_binary_u8`] / [`close_binary_u8`]: square structuring element,
//!   repeated `iterations` times. Neighbors outside the raster are ignored,
//!   so the frame neither erodes nor dilates the mask.
//! - [`ZhangSuen`]: two-subiteration parallel thinning down to a connected,
//!   one-pixel-wide medial curve.
//! - [`extract_centerline`]: skeletonize, optionally smooth, then drop small
//!   8-connected fragments.

mod centerline;
mod morphology;
mod thinning;

pub use centerline::{SkeletonConfig, extract_centerline, remove_small_objects, smooth_binary};
pub use morphology::{
    CleanupConfig, MorphStep, SquareKernel, cleanup_mask, close_binary_u8, dilate_binary_u8,
    erode_binary_u8, open_binary_u8,
};
pub use thinning::{Skeletonizer, ZhangSuen};
