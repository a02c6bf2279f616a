//! Track/background mask providers.
//!
//! Both providers take an 8-bit RGB view and produce a binary `Image<u8>`
//! with track pixels set to `255` and background to `0`.
//!
//! - [`MaskMethod::GrayThresholdInv`]: dark track on a light background.
//!   Luma uses BT.601 weights, matching the usual BGR-to-gray conversion of
//!   camera pipelines, and a pixel is track iff `luma <= threshold`.
//! - [`MaskMethod::HsvRange`]: inclusive box in 8-bit HSV with hue halved to
//!   `[0, 180)` and saturation/value scaled to `[0, 255]`.

mod threshold;

pub use threshold::{
    HsvBounds, MaskMethod, build_mask, gray_threshold_inv, hsv_in_range, hsv_u8, luma_bt601,
};
