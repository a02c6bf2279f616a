use log::debug;
use palette::{FromColor, Hsv, Srgb};
use tr_core::{Image, ImageView};

/// Inclusive HSV box, `[h, s, v]` with `h` in `[0, 180]` and `s`, `v` in
/// `[0, 255]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HsvBounds {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl Default for HsvBounds {
    /// Dark gray asphalt: low saturation, low-to-mid brightness.
    fn default() -> Self {
        Self {
            lower: [0, 0, 30],
            upper: [180, 70, 130],
        }
    }
}

impl HsvBounds {
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|c| self.lower[c] <= hsv[c] && hsv[c] <= self.upper[c])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskMethod {
    GrayThresholdInv { threshold: u8 },
    HsvRange(HsvBounds),
}

impl Default for MaskMethod {
    fn default() -> Self {
        Self::GrayThresholdInv { threshold: 127 }
    }
}

pub fn build_mask(rgb: &ImageView<'_, [u8; 3]>, method: &MaskMethod) -> Image<u8> {
    let mask = match method {
        MaskMethod::GrayThresholdInv { threshold } => gray_threshold_inv(rgb, *threshold),
        MaskMethod::HsvRange(bounds) => hsv_in_range(rgb, bounds),
    };
    debug!(
        "mask {:?}: {}x{}, {} track pixels",
        method,
        mask.width(),
        mask.height(),
        mask.count_set()
    );
    mask
}

/// BT.601 luma in 14-bit fixed point, rounded half up.
pub fn luma_bt601([r, g, b]: [u8; 3]) -> u8 {
    const R: u32 = 4899;
    const G: u32 = 9617;
    const B: u32 = 1868;
    let y = (u32::from(r) * R + u32::from(g) * G + u32::from(b) * B + (1 << 13)) >> 14;
    y as u8
}

pub fn gray_threshold_inv(rgb: &ImageView<'_, [u8; 3]>, threshold: u8) -> Image<u8> {
    rgb.map(|&px| if luma_bt601(px) <= threshold { 255 } else { 0 })
}

/// 8-bit HSV: hue in degrees halved (`[0, 180)`), saturation and value
/// scaled to `[0, 255]`.
pub fn hsv_u8([r, g, b]: [u8; 3]) -> [u8; 3] {
    let hsv = Hsv::from_color(Srgb::new(r, g, b).into_format::<f32>());
    let h = (hsv.hue.into_positive_degrees() / 2.0).round();
    let h = if h >= 180.0 { 0 } else { h as u8 };
    let s = (hsv.saturation * 255.0).round().clamp(0.0, 255.0) as u8;
    let v = (hsv.value * 255.0).round().clamp(0.0, 255.0) as u8;
    [h, s, v]
}

pub fn hsv_in_range(rgb: &ImageView<'_, [u8; 3]>, bounds: &HsvBounds) -> Image<u8> {
    rgb.map(|&px| if bounds.contains(hsv_u8(px)) { 255 } else { 0 })
}

#[cfg(test)]
mod tests {
    use tr_core::Image;

    use super::{HsvBounds, MaskMethod, build_mask, hsv_u8, luma_bt601};

    #[test]
    fn luma_matches_bt601_weights() {
        assert_eq!(luma_bt601([0, 0, 0]), 0);
        assert_eq!(luma_bt601([255, 255, 255]), 255);
        assert_eq!(luma_bt601([255, 0, 0]), 76);
        assert_eq!(luma_bt601([0, 255, 0]), 150);
        assert_eq!(luma_bt601([0, 0, 255]), 29);
    }

    #[test]
    fn luma_uses_fixed_point_rounding() {
        // A float round would give 227 and 128 here.
        assert_eq!(luma_bt601([255, 255, 5]), 226);
        assert_eq!(luma_bt601([0, 184, 171]), 127);
        for v in [0u8, 1, 127, 128, 254, 255] {
            assert_eq!(luma_bt601([v, v, v]), v);
        }

        let img = Image::from_vec(1, 1, vec![[0u8, 184, 171]]).expect("valid image");
        let mask = build_mask(&img.as_view(), &MaskMethod::default());
        assert_eq!(mask.data(), &[255]);
    }

    #[test]
    fn gray_threshold_marks_dark_pixels_as_track() {
        let img = Image::from_vec(
            4,
            1,
            vec![[10u8, 10, 10], [127, 127, 127], [128, 128, 128], [250, 250, 250]],
        )
        .expect("valid image");

        let mask = build_mask(&img.as_view(), &MaskMethod::default());
        assert_eq!(mask.data(), &[255, 255, 0, 0]);
    }

    #[test]
    fn hsv_conversion_uses_half_degree_hue() {
        assert_eq!(hsv_u8([255, 0, 0]), [0, 255, 255]);
        assert_eq!(hsv_u8([0, 255, 0]), [60, 255, 255]);
        assert_eq!(hsv_u8([0, 0, 255]), [120, 255, 255]);
        assert_eq!(hsv_u8([80, 80, 80]), [0, 0, 80]);
    }

    #[test]
    fn hsv_range_keeps_gray_road_and_drops_grass() {
        let img = Image::from_vec(
            3,
            1,
            vec![[90u8, 90, 95], [40, 160, 40], [230, 230, 230]],
        )
        .expect("valid image");

        let mask = build_mask(&img.as_view(), &MaskMethod::HsvRange(HsvBounds::default()));
        assert_eq!(mask.data(), &[255, 0, 0]);
    }
}
