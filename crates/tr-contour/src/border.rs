use image::GrayImage;
use imageproc::contours::{BorderType, find_contours};
use log::debug;
use tr_core::{ImageView, Point2i};

use crate::contour::{Contour, ContourExtractor, ContourKind};

/// Suzuki–Abe border following via `imageproc::contours::find_contours`.
///
/// All borders are returned in discovery order (raster scan), outer and hole
/// alike, with every border pixel kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct BorderFollowing;

impl ContourExtractor for BorderFollowing {
    fn extract(&self, raster: &ImageView<'_, u8>) -> Vec<Contour> {
        if raster.is_empty() {
            return Vec::new();
        }

        let dense = raster.map(|&v| if v != 0 { 255u8 } else { 0 });
        let Some(gray) =
            GrayImage::from_raw(raster.width() as u32, raster.height() as u32, dense.into_vec())
        else {
            return Vec::new();
        };

        let contours: Vec<Contour> = find_contours::<i32>(&gray)
            .into_iter()
            .filter(|c| !c.points.is_empty())
            .map(|c| Contour {
                points: c.points.iter().map(|p| Point2i::new(p.x, p.y)).collect(),
                kind: match c.border_type {
                    BorderType::Outer => ContourKind::Outer,
                    BorderType::Hole => ContourKind::Hole,
                },
                parent: c.parent,
            })
            .collect();

        debug!("border following: {} contours", contours.len());
        contours
    }
}
