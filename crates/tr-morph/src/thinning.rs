use log::debug;
use tr_core::{Image, ImageView};

/// Reduces a binary region to a one-pixel-wide medial curve of the same
/// dimensions. An all-background input yields an all-zero raster.
pub trait Skeletonizer {
    fn skeletonize(&self, mask: &ImageView<'_, u8>) -> Image<u8>;
}

/// Zhang–Suen parallel thinning.
///
/// Each iteration runs two subiterations; a pixel is deleted when it has
/// between 2 and 6 set 8-neighbors, exactly one background-to-foreground
/// transition around its neighborhood, and the subiteration's
/// directional condition holds (south-east boundary first, then north-west).
#[derive(Debug, Clone, Copy, Default)]
pub struct ZhangSuen;

impl Skeletonizer for ZhangSuen {
    fn skeletonize(&self, mask: &ImageView<'_, u8>) -> Image<u8> {
        let (w, h) = mask.dimensions();
        let mut px = mask.map(|&v| v != 0).into_vec();
        let mut marked = Vec::new();

        let mut iterations = 0usize;
        loop {
            let mut changed = false;
            for pass in [Pass::First, Pass::Second] {
                marked.clear();
                for y in 0..h {
                    for x in 0..w {
                        if px[y * w + x] && deletable(&px, w, h, x, y, pass) {
                            marked.push(y * w + x);
                        }
                    }
                }
                for &i in &marked {
                    px[i] = false;
                }
                changed |= !marked.is_empty();
            }
            iterations += 1;
            if !changed {
                break;
            }
        }
        debug!("zhang-suen: {w}x{h} converged after {iterations} iterations");

        let data = px.into_iter().map(|v| if v { 255 } else { 0 }).collect();
        Image::from_vec(w, h, data).expect("skeleton keeps input dimensions")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    First,
    Second,
}

// Neighbors P2..P9 clockwise from north.
const RING: [(isize, isize); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

fn deletable(px: &[bool], w: usize, h: usize, x: usize, y: usize, pass: Pass) -> bool {
    let mut p = [false; 8];
    for (slot, (dx, dy)) in p.iter_mut().zip(RING) {
        let nx = x as isize + dx;
        let ny = y as isize + dy;
        *slot = nx >= 0
            && ny >= 0
            && (nx as usize) < w
            && (ny as usize) < h
            && px[ny as usize * w + nx as usize];
    }

    let b = p.iter().filter(|&&v| v).count();
    if !(2..=6).contains(&b) {
        return false;
    }

    let a = (0..8).filter(|&i| !p[i] && p[(i + 1) % 8]).count();
    if a != 1 {
        return false;
    }

    let [p2, _, p4, _, p6, _, p8, _] = p;
    match pass {
        Pass::First => !(p2 && p4 && p6) && !(p4 && p6 && p8),
        Pass::Second => !(p2 && p4 && p8) && !(p2 && p6 && p8),
    }
}

#[cfg(test)]
mod tests {
    use tr_core::Image;

    use super::{Skeletonizer, ZhangSuen};

    fn bar(w: usize, h: usize, x0: usize, x1: usize, y0: usize, y1: usize) -> Image<u8> {
        Image::from_fn(w, h, |x, y| {
            if (x0..x1).contains(&x) && (y0..y1).contains(&y) {
                255
            } else {
                0
            }
        })
    }

    #[test]
    fn empty_mask_gives_empty_skeleton() {
        let img = Image::new_fill(12, 9, 0u8);
        let skel = ZhangSuen.skeletonize(&img.as_view());
        assert_eq!(skel.dimensions(), (12, 9));
        assert_eq!(skel.count_set(), 0);
    }

    #[test]
    fn horizontal_bar_thins_to_center_row() {
        let img = bar(30, 11, 3, 27, 3, 8);
        let skel = ZhangSuen.skeletonize(&img.as_view());
        let view = skel.as_view();

        for x in 7..23 {
            let rows: Vec<usize> = (0..11).filter(|&y| view.get(x, y) == Some(&255)).collect();
            assert_eq!(rows, vec![5], "column {x}");
        }
    }

    #[test]
    fn skeleton_stays_inside_mask() {
        let img = Image::from_fn(40, 40, |x, y| {
            let dx = x as f64 - 20.0;
            let dy = y as f64 - 20.0;
            let r = (dx * dx + dy * dy).sqrt();
            if (9.0..15.0).contains(&r) { 255u8 } else { 0 }
        });

        let skel = ZhangSuen.skeletonize(&img.as_view());
        assert!(skel.count_set() > 0);
        assert!(skel.count_set() < img.count_set() / 3);
        for (s, m) in skel.data().iter().zip(img.data()) {
            assert!(*s == 0 || *m != 0);
        }
    }

    #[test]
    fn one_pixel_line_is_already_thin() {
        let img = bar(20, 5, 2, 18, 2, 3);
        let skel = ZhangSuen.skeletonize(&img.as_view());
        // Endpoints have a single neighbor and are kept.
        assert_eq!(skel, img);
    }
}
