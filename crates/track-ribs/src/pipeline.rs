use core::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, Rgb, RgbImage};
use log::debug;
use tr_contour::ContourMethod;
use tr_core::Image;
use tr_mask::{MaskMethod, build_mask};
use tr_morph::{CleanupConfig, SkeletonConfig, ZhangSuen, cleanup_mask, extract_centerline};
use tr_rib::{RIB_COLOR, RibConfig, RibSegment, RibStats, SkeletonRibs, render_ribs, ribs_from_skeleton};

/// Which mask the rays are cast over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RayMaskSource {
    /// The thresholded mask before morphology cleanup.
    #[default]
    Raw,
    /// The mask after close/open cleanup.
    Cleaned,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub mask: MaskMethod,
    pub cleanup: CleanupConfig,
    pub skeleton: SkeletonConfig,
    pub contour: ContourMethod,
    pub ribs: RibConfig,
    pub ray_mask: RayMaskSource,
    pub color: Rgb<u8>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mask: MaskMethod::default(),
            cleanup: CleanupConfig::default(),
            skeleton: SkeletonConfig::default(),
            contour: ContourMethod::default(),
            ribs: RibConfig::default(),
            ray_mask: RayMaskSource::default(),
            color: RIB_COLOR,
        }
    }
}

/// Thresholded mask and its cleaned version, both `0`/`255`.
#[derive(Debug, Clone, PartialEq)]
pub struct Masks {
    pub raw: Image<u8>,
    pub cleaned: Image<u8>,
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub mask: Image<u8>,
    pub cleaned: Image<u8>,
    pub skeleton: Image<u8>,
    /// Contours found on the skeleton before selection.
    pub contour_count: usize,
    /// Point count of the selected centerline (`0` when none).
    pub centerline_len: usize,
    pub ribs: Vec<RibSegment>,
    pub stats: RibStats,
    /// Input image with the ribs drawn on top.
    pub overlay: RgbImage,
}

#[derive(Debug)]
pub enum PipelineError {
    Io { path: PathBuf, source: std::io::Error },
    Decode { path: PathBuf, source: image::ImageError },
    Image(tr_core::Error),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, .. } => write!(f, "cannot read {}", path.display()),
            Self::Decode { path, .. } => write!(f, "cannot decode image {}", path.display()),
            Self::Image(err) => write!(f, "image error: {err}"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Decode { source, .. } => Some(source),
            Self::Image(err) => Some(err),
        }
    }
}

impl From<tr_core::Error> for PipelineError {
    fn from(err: tr_core::Error) -> Self {
        Self::Image(err)
    }
}

fn to_rgb_image(input: &DynamicImage) -> Result<Image<[u8; 3]>, tr_core::Error> {
    let rgb = input.to_rgb8();
    let (w, h) = rgb.dimensions();
    let pixels = rgb.pixels().map(|p| p.0).collect();
    Image::from_vec(w as usize, h as usize, pixels)
}

/// Mask stage only: threshold, then close/open cleanup.
pub fn build_masks(input: &DynamicImage, cfg: &PipelineConfig) -> Result<Masks, PipelineError> {
    let rgb = to_rgb_image(input)?;
    let raw = build_mask(&rgb.as_view(), &cfg.mask);
    let cleaned = cleanup_mask(&raw.as_view(), &cfg.cleanup);
    Ok(Masks { raw, cleaned })
}

/// Runs every stage on a decoded image.
pub fn run_pipeline(input: &DynamicImage, cfg: &PipelineConfig) -> Result<PipelineOutput, PipelineError> {
    let Masks { raw, cleaned } = build_masks(input, cfg)?;
    let skeleton = extract_centerline(&cleaned.as_view(), &ZhangSuen, &cfg.skeleton);

    let ray_mask = match cfg.ray_mask {
        RayMaskSource::Raw => &raw,
        RayMaskSource::Cleaned => &cleaned,
    };
    let SkeletonRibs {
        contour_count,
        centerline_len,
        ribs,
    } = ribs_from_skeleton(&ray_mask.as_view(), &skeleton.as_view(), &cfg.contour, &cfg.ribs)?;

    let stats = RibStats::from_ribs(&ribs);
    let overlay = render_ribs(input, &ribs, cfg.color);
    debug!(
        "pipeline: {} contours, centerline {} points, {} ribs ({} capped)",
        contour_count, centerline_len, stats.count, stats.truncated
    );

    Ok(PipelineOutput {
        mask: raw,
        cleaned,
        skeleton,
        contour_count,
        centerline_len,
        ribs,
        stats,
        overlay,
    })
}

/// Reads and decodes `path`, then runs [`run_pipeline`].
pub fn process_path(path: impl AsRef<Path>, cfg: &PipelineConfig) -> Result<PipelineOutput, PipelineError> {
    let input = load_image(path.as_ref())?;
    run_pipeline(&input, cfg)
}

/// Reads `path` and decodes it, guessing the format from its content.
pub fn load_image(path: &Path) -> Result<DynamicImage, PipelineError> {
    let bytes = fs::read(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    image::load_from_memory(&bytes).map_err(|source| PipelineError::Decode {
        path: path.to_path_buf(),
        source,
    })
}
