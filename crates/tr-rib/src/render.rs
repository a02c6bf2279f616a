use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;

use crate::extract::RibSegment;

pub const RIB_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Returns an RGB copy of `base` with every rib drawn as a one-pixel line.
pub fn render_ribs(base: &DynamicImage, ribs: &[RibSegment], color: Rgb<u8>) -> RgbImage {
    let mut canvas = base.to_rgb8();
    render_ribs_mut(&mut canvas, ribs, color);
    canvas
}

/// Draws each rib from `neg` to `pos` onto `canvas`. Segments are clipped to
/// the canvas.
pub fn render_ribs_mut(canvas: &mut RgbImage, ribs: &[RibSegment], color: Rgb<u8>) {
    for rib in ribs {
        draw_line_segment_mut(
            canvas,
            (rib.neg.x as f32, rib.neg.y as f32),
            (rib.pos.x as f32, rib.pos.y as f32),
            color,
        );
    }
}

#[cfg(test)]
mod tests {
    use image::{DynamicImage, GrayImage, Luma, Rgb};
    use tr_core::Point2i;

    use super::{RIB_COLOR, render_ribs};
    use crate::extract::RibSegment;
    use crate::ray::RayStop;

    fn vertical_rib(x: i32, y0: i32, y1: i32) -> RibSegment {
        RibSegment {
            sample_index: 0,
            origin: Point2i::new(x, (y0 + y1) / 2),
            angle: core::f64::consts::FRAC_PI_2,
            neg: Point2i::new(x, y0),
            pos: Point2i::new(x, y1),
            neg_stop: RayStop::Background,
            pos_stop: RayStop::Background,
        }
    }

    #[test]
    fn no_ribs_is_plain_rgb_copy() {
        let base = DynamicImage::ImageLuma8(GrayImage::from_pixel(12, 8, Luma([90])));
        let out = render_ribs(&base, &[], RIB_COLOR);
        assert_eq!(out, base.to_rgb8());
    }

    #[test]
    fn ribs_are_drawn_in_color_and_nothing_else_changes() {
        let base = DynamicImage::ImageLuma8(GrayImage::from_pixel(20, 20, Luma([40])));
        let ribs = [vertical_rib(5, 3, 12), vertical_rib(14, 8, 8)];
        let out = render_ribs(&base, &ribs, RIB_COLOR);

        for y in 3..=12 {
            assert_eq!(*out.get_pixel(5, y), RIB_COLOR, "row {y}");
        }
        assert_eq!(*out.get_pixel(14, 8), RIB_COLOR);

        let colored = out.pixels().filter(|&&p| p == RIB_COLOR).count();
        assert_eq!(colored, 11);
        assert_eq!(*out.get_pixel(0, 0), Rgb([40, 40, 40]));
    }
}
