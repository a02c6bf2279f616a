use log::debug;
use tr_core::{Image, ImageView};

/// Square structuring element of side `size`, anchored at `size / 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SquareKernel {
    pub size: usize,
}

impl SquareKernel {
    pub const fn new(size: usize) -> Self {
        Self { size }
    }

    /// Inclusive offset range `(lo, hi)` covered by the kernel.
    fn offsets(self) -> (isize, isize) {
        let size = self.size.max(1) as isize;
        let lo = -(size / 2);
        (lo, lo + size - 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MorphStep {
    pub kernel: SquareKernel,
    pub iterations: usize,
}

/// Mask cleanup: closing first (fills pin holes), then opening (drops specks).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupConfig {
    pub close: Option<MorphStep>,
    pub open: Option<MorphStep>,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            close: None,
            open: Some(MorphStep {
                kernel: SquareKernel::new(3),
                iterations: 2,
            }),
        }
    }
}

pub fn cleanup_mask(src: &ImageView<'_, u8>, cfg: &CleanupConfig) -> Image<u8> {
    let mut out = src.map(|&v| if v != 0 { 255u8 } else { 0 });
    if let Some(step) = cfg.close {
        out = close_binary_u8(&out.as_view(), step.kernel, step.iterations);
    }
    if let Some(step) = cfg.open {
        out = open_binary_u8(&out.as_view(), step.kernel, step.iterations);
    }
    debug!("cleanup: {} set pixels after close/open", out.count_set());
    out
}

pub fn erode_binary_u8(src: &ImageView<'_, u8>, kernel: SquareKernel) -> Image<u8> {
    min_max_filter(src, kernel, Op::Erode)
}

pub fn dilate_binary_u8(src: &ImageView<'_, u8>, kernel: SquareKernel) -> Image<u8> {
    min_max_filter(src, kernel, Op::Dilate)
}

pub fn open_binary_u8(src: &ImageView<'_, u8>, kernel: SquareKernel, iterations: usize) -> Image<u8> {
    let eroded = repeat(src, kernel, iterations, Op::Erode);
    repeat(&eroded.as_view(), kernel, iterations, Op::Dilate)
}

pub fn close_binary_u8(
    src: &ImageView<'_, u8>,
    kernel: SquareKernel,
    iterations: usize,
) -> Image<u8> {
    let dilated = repeat(src, kernel, iterations, Op::Dilate);
    repeat(&dilated.as_view(), kernel, iterations, Op::Erode)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Erode,
    Dilate,
}

fn repeat(src: &ImageView<'_, u8>, kernel: SquareKernel, iterations: usize, op: Op) -> Image<u8> {
    let mut out = src.map(|&v| if v != 0 { 255u8 } else { 0 });
    for _ in 0..iterations {
        out = min_max_filter(&out.as_view(), kernel, op);
    }
    out
}

// A square window is separable: filter rows, then columns.
fn min_max_filter(src: &ImageView<'_, u8>, kernel: SquareKernel, op: Op) -> Image<u8> {
    let (w, h) = src.dimensions();
    if w == 0 || h == 0 {
        return Image::new_fill(w, h, 0u8);
    }

    let (lo, hi) = kernel.offsets();
    let set = src.map(|&v| v != 0);

    let horizontal = Image::from_fn(w, h, |x, y| {
        window_hit(lo, hi, x, w, op, |nx| set.data()[y * w + nx])
    });
    Image::from_fn(w, h, |x, y| {
        let hit = window_hit(lo, hi, y, h, op, |ny| horizontal.data()[ny * w + x]);
        if hit { 255 } else { 0 }
    })
}

#[inline]
fn window_hit(
    lo: isize,
    hi: isize,
    center: usize,
    len: usize,
    op: Op,
    is_set: impl Fn(usize) -> bool,
) -> bool {
    let start = (center as isize + lo).max(0) as usize;
    let end = ((center as isize + hi).min(len as isize - 1)) as usize;
    match op {
        Op::Erode => (start..=end).all(is_set),
        Op::Dilate => (start..=end).any(is_set),
    }
}
