use log::{debug, warn};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tr_contour::{ContourExtractor, select_centerline};
use tr_core::{Error, ImageView, Point2i};

use crate::ray::{RayStop, cast_ray};
use crate::tangent::{DEFAULT_TANGENT_WINDOW, perpendicular, tangent_angle};

/// How sample positions are chosen along the centerline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SamplingMode {
    /// Every `interval`-th point, starting at index 0.
    #[default]
    Index,
    /// The first point at or past each multiple of `interval` pixels of
    /// accumulated arc length, starting at index 0.
    ArcLength,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RibConfig {
    /// Sampling stride; `0` is treated as `1`.
    pub interval: usize,
    /// Cap on each half-ray, in pixels.
    pub max_length: f64,
    /// Half-width of the tangent finite difference, in points.
    pub tangent_window: usize,
    pub sampling: SamplingMode,
}

impl Default for RibConfig {
    fn default() -> Self {
        Self {
            interval: 20,
            max_length: 50.0,
            tangent_window: DEFAULT_TANGENT_WINDOW,
            sampling: SamplingMode::Index,
        }
    }
}

/// One cross-section of the track, spanning `neg` to `pos` through `origin`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RibSegment {
    /// Index of `origin` in the centerline point list.
    pub sample_index: usize,
    pub origin: Point2i,
    /// Rib direction in radians (tangent plus a quarter turn).
    pub angle: f64,
    pub neg: Point2i,
    pub pos: Point2i,
    pub neg_stop: RayStop,
    pub pos_stop: RayStop,
}

impl RibSegment {
    /// Euclidean distance between the two endpoints.
    pub fn length(&self) -> f64 {
        self.neg.distance(self.pos)
    }

    /// True when either half was cut by the length cap.
    pub fn is_truncated(&self) -> bool {
        self.neg_stop == RayStop::MaxLength || self.pos_stop == RayStop::MaxLength
    }
}

/// Indices of the centerline points that receive a rib, in increasing order.
pub fn sample_indices(points: &[Point2i], cfg: &RibConfig) -> Vec<usize> {
    if cfg.interval == 0 {
        warn!("rib interval 0 is treated as 1");
    }
    let step = cfg.interval.max(1);
    match cfg.sampling {
        SamplingMode::Index => (0..points.len()).step_by(step).collect(),
        SamplingMode::ArcLength => {
            let step = step as f64;
            let mut out = Vec::new();
            let mut travelled = 0.0;
            let mut next = 0.0;
            for (i, p) in points.iter().enumerate() {
                if i > 0 {
                    travelled += points[i - 1].distance(*p);
                }
                if travelled >= next {
                    out.push(i);
                    while next <= travelled {
                        next += step;
                    }
                }
            }
            out
        }
    }
}

/// Builds the rib at `points[index]`.
///
/// # Panics
/// If `index >= points.len()`.
pub fn rib_at(mask: &ImageView<'_, u8>, points: &[Point2i], index: usize, cfg: &RibConfig) -> RibSegment {
    let origin = points[index];
    let angle = perpendicular(tangent_angle(points, index, cfg.tangent_window));
    let hit = cast_ray(mask, origin, angle, cfg.max_length);
    RibSegment {
        sample_index: index,
        origin,
        angle,
        neg: hit.neg,
        pos: hit.pos,
        neg_stop: hit.neg_stop,
        pos_stop: hit.pos_stop,
    }
}

/// Samples ribs along `points` over `mask`, ordered by sample index.
///
/// An empty point list gives no ribs. Mask and points are not checked
/// against each other: origins off the track simply produce short ribs.
pub fn extract_ribs(mask: &ImageView<'_, u8>, points: &[Point2i], cfg: &RibConfig) -> Vec<RibSegment> {
    let indices = sample_indices(points, cfg);

    #[cfg(feature = "parallel")]
    let ribs: Vec<RibSegment> = indices.par_iter().map(|&i| rib_at(mask, points, i, cfg)).collect();
    #[cfg(not(feature = "parallel"))]
    let ribs: Vec<RibSegment> = indices.iter().map(|&i| rib_at(mask, points, i, cfg)).collect();

    debug!(
        "ribs: {} samples over {} centerline points (interval {}, {:?})",
        ribs.len(),
        points.len(),
        cfg.interval,
        cfg.sampling
    );
    ribs
}

/// Ribs sampled along a skeleton's centerline, with what was found on the way.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SkeletonRibs {
    /// Contours found on the skeleton before selection.
    pub contour_count: usize,
    /// Point count of the selected centerline (`0` when none).
    pub centerline_len: usize,
    pub ribs: Vec<RibSegment>,
}

/// Extracts contours from `skeleton`, keeps the longest as the centerline and
/// samples ribs along it over `mask`.
///
/// A skeleton without contours gives an empty result.
pub fn ribs_from_skeleton<E: ContourExtractor + ?Sized>(
    mask: &ImageView<'_, u8>,
    skeleton: &ImageView<'_, u8>,
    extractor: &E,
    cfg: &RibConfig,
) -> Result<SkeletonRibs, Error> {
    if mask.dimensions() != skeleton.dimensions() {
        return Err(Error::DimensionMismatch {
            expected: mask.dimensions(),
            actual: skeleton.dimensions(),
        });
    }

    let contours = extractor.extract(skeleton);
    let Some(centerline) = select_centerline(&contours) else {
        debug!("ribs: skeleton has no contours");
        return Ok(SkeletonRibs::default());
    };
    Ok(SkeletonRibs {
        contour_count: contours.len(),
        centerline_len: centerline.len(),
        ribs: extract_ribs(mask, &centerline.points, cfg),
    })
}

/// [`ribs_from_skeleton`] without the contour bookkeeping.
pub fn extract_ribs_from_skeleton<E: ContourExtractor + ?Sized>(
    mask: &ImageView<'_, u8>,
    skeleton: &ImageView<'_, u8>,
    extractor: &E,
    cfg: &RibConfig,
) -> Result<Vec<RibSegment>, Error> {
    ribs_from_skeleton(mask, skeleton, extractor, cfg).map(|found| found.ribs)
}
