use image::{GrayImage, Luma};
use imageproc::region_labelling::{Connectivity, connected_components};
use log::debug;
use tr_core::{Image, ImageView};

use crate::thinning::Skeletonizer;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SkeletonConfig {
    /// Gaussian sigma applied to the skeleton before re-thresholding at half
    /// intensity. `None` or a non-positive value disables smoothing.
    pub smooth_sigma: Option<f32>,
    /// 8-connected skeleton fragments with fewer pixels are dropped.
    /// `0` and `1` keep everything.
    pub min_object_size: usize,
}

/// Skeletonizes `mask` and applies the configured post-processing.
pub fn extract_centerline(
    mask: &ImageView<'_, u8>,
    skeletonizer: &dyn Skeletonizer,
    cfg: &SkeletonConfig,
) -> Image<u8> {
    let (w, h) = mask.dimensions();
    if !mask.any_set() {
        debug!("centerline: empty mask, returning blank skeleton");
        return Image::new_fill(w, h, 0u8);
    }

    let mut skeleton = skeletonizer.skeletonize(mask);
    if let Some(sigma) = cfg.smooth_sigma.filter(|&s| s > 0.0) {
        skeleton = smooth_binary(&skeleton.as_view(), sigma);
    }
    if cfg.min_object_size > 1 {
        skeleton = remove_small_objects(&skeleton.as_view(), cfg.min_object_size);
    }
    debug!("centerline: {} skeleton pixels", skeleton.count_set());
    skeleton
}

/// Gaussian blur of a binary raster followed by a threshold at half
/// intensity (`> 127`). Taps outside the raster repeat the nearest edge
/// pixel, so set pixels on the border lose less weight than interior ones.
pub fn smooth_binary(src: &ImageView<'_, u8>, sigma: f32) -> Image<u8> {
    let gray = to_gray(src);
    let blurred = imageproc::filter::gaussian_blur_f32(&gray, sigma);
    from_gray(&blurred, |v| if v > 127 { 255 } else { 0 })
}

/// Clears every 8-connected component with fewer than `min_size` pixels.
pub fn remove_small_objects(src: &ImageView<'_, u8>, min_size: usize) -> Image<u8> {
    let gray = to_gray(src);
    let labels = connected_components(&gray, Connectivity::Eight, Luma([0u8]));

    let mut sizes = Vec::new();
    for label in labels.pixels().map(|p| p[0] as usize) {
        if label >= sizes.len() {
            sizes.resize(label + 1, 0usize);
        }
        sizes[label] += 1;
    }

    let data = labels
        .pixels()
        .map(|p| {
            let label = p[0] as usize;
            if label != 0 && sizes[label] >= min_size { 255 } else { 0 }
        })
        .collect();
    Image::from_vec(src.width(), src.height(), data).expect("labels keep input dimensions")
}

fn to_gray(src: &ImageView<'_, u8>) -> GrayImage {
    let dense = src.map(|&v| if v != 0 { 255u8 } else { 0 });
    GrayImage::from_raw(src.width() as u32, src.height() as u32, dense.into_vec())
        .expect("dense buffer matches dimensions")
}

fn from_gray(gray: &GrayImage, f: impl Fn(u8) -> u8) -> Image<u8> {
    let data = gray.pixels().map(|p| f(p[0])).collect();
    Image::from_vec(gray.width() as usize, gray.height() as usize, data)
        .expect("gray buffer matches dimensions")
}

#[cfg(test)]
mod tests {
    use tr_core::Image;

    use super::{SkeletonConfig, extract_centerline, remove_small_objects, smooth_binary};
    use crate::ZhangSuen;

    #[test]
    fn empty_mask_yields_zero_skeleton() {
        let img = Image::new_fill(16, 8, 0u8);
        let out = extract_centerline(&img.as_view(), &ZhangSuen, &SkeletonConfig::default());
        assert_eq!(out.dimensions(), (16, 8));
        assert_eq!(out.count_set(), 0);
    }

    #[test]
    fn small_fragments_are_removed() {
        // Diagonal pair: one 8-connected component of size 2.
        let img = Image::from_fn(20, 10, |x, y| {
            let line = y == 2 && (1..15).contains(&x);
            let pair = (x, y) == (17, 7) || (x, y) == (18, 8);
            if line || pair { 255u8 } else { 0 }
        });

        let kept = remove_small_objects(&img.as_view(), 3);
        assert_eq!(kept.count_set(), 14);
        assert_eq!(kept.as_view().get(17, 7), Some(&0));

        let all = remove_small_objects(&img.as_view(), 2);
        assert_eq!(all.count_set(), 16);
    }

    #[test]
    fn centerline_drops_specks_after_thinning() {
        let img = Image::from_fn(40, 20, |x, y| {
            let band = (2..38).contains(&x) && (6..13).contains(&y);
            let speck = x == 37 && y == 1;
            if band || speck { 255u8 } else { 0 }
        });

        let cfg = SkeletonConfig {
            smooth_sigma: None,
            min_object_size: 5,
        };
        let out = extract_centerline(&img.as_view(), &ZhangSuen, &cfg);
        assert_eq!(out.as_view().get(37, 1), Some(&0));
        assert_eq!(out.as_view().get(20, 9), Some(&255));
    }

    #[test]
    fn smoothing_keeps_solid_regions_and_drops_isolated_pixels() {
        let img = Image::from_fn(20, 20, |x, y| {
            if (3..9).contains(&x) && (3..9).contains(&y) || (x, y) == (15, 15) {
                255u8
            } else {
                0
            }
        });

        let out = smooth_binary(&img.as_view(), 0.8);
        assert_eq!(out.as_view().get(5, 5), Some(&255));
        assert_eq!(out.as_view().get(15, 15), Some(&0));
    }

    #[test]
    fn corner_pixels_survive_smoothing_with_replicated_edges() {
        // Out-of-raster taps repeat the edge, so a corner keeps ~0.56 of its
        // weight while the same pixel one step inward keeps ~0.25.
        let corner = Image::from_fn(20, 20, |x, y| if (x, y) == (0, 19) { 255u8 } else { 0 });
        let out = smooth_binary(&corner.as_view(), 0.8);
        assert_eq!(out.as_view().get(0, 19), Some(&255));
        assert_eq!(out.count_set(), 1);

        let inset = Image::from_fn(20, 20, |x, y| if (x, y) == (1, 18) { 255u8 } else { 0 });
        assert_eq!(smooth_binary(&inset.as_view(), 0.8).count_set(), 0);
    }
}
