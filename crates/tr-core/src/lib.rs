//! Foundational primitives for track cross-section extraction.
//!
//! ## Images
//! Images are dense and row-major. [`ImageView`] borrows an [`Image`]
//! without copying; stages take views and return owned images.
//!
//! ## Binary Rasters
//! Masks and skeletons are stored as `Image<u8>`. A pixel is set iff its
//! value is `> 0`; producers write `0` or `255`.
//!
//! ## Pixel Coordinates
//! Integer coordinates address pixel `(x, y)` with `x` along a row. Real
//! positions map to pixels by truncation toward zero ([`Point2d::truncate`]),
//! so `-0.5` maps to column `0`. Signed lookups through
//! [`ImageView::get_signed`] reject anything outside `[0, width) x [0, height)`.

mod error;
mod geom;
mod image;

pub use error::Error;
pub use geom::{Point2d, Point2i, Vec2d, polyline_length};
pub use image::{Image, ImageView};
