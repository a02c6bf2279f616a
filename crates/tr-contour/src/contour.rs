use log::debug;
use tr_core::{ImageView, Point2i, polyline_length};

use crate::border::BorderFollowing;
use crate::chains::SkeletonChains;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContourKind {
    /// Outer border of a connected component.
    Outer,
    /// Border of a hole inside a component.
    Hole,
    /// Skeleton run between two nodes (endpoints or junctions).
    Chain,
    /// Node-free skeleton cycle.
    Loop,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    pub points: Vec<Point2i>,
    pub kind: ContourKind,
    /// Index of the enclosing border, for border-following output.
    pub parent: Option<usize>,
}

impl Contour {
    pub fn new(points: Vec<Point2i>, kind: ContourKind) -> Self {
        Self {
            points,
            kind,
            parent: None,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Open polyline length; no closing segment is added.
    pub fn arc_length(&self) -> f64 {
        polyline_length(&self.points)
    }
}

/// Produces ordered point sequences from a binary (`> 0`) raster. An empty
/// raster yields an empty list.
pub trait ContourExtractor {
    fn extract(&self, raster: &ImageView<'_, u8>) -> Vec<Contour>;
}

impl<E: ContourExtractor + ?Sized> ContourExtractor for &E {
    fn extract(&self, raster: &ImageView<'_, u8>) -> Vec<Contour> {
        (**self).extract(raster)
    }
}

/// Runtime selection between the available extractors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContourMethod {
    #[default]
    BorderFollowing,
    SkeletonChains(SkeletonChains),
}

impl ContourExtractor for ContourMethod {
    fn extract(&self, raster: &ImageView<'_, u8>) -> Vec<Contour> {
        match self {
            Self::BorderFollowing => BorderFollowing.extract(raster),
            Self::SkeletonChains(chains) => chains.extract(raster),
        }
    }
}

/// Returns the contour with the greatest arc length. Ties go to the earliest
/// contour in `contours`; an empty slice gives `None`.
pub fn select_centerline(contours: &[Contour]) -> Option<&Contour> {
    let mut best: Option<(&Contour, f64)> = None;
    for contour in contours {
        let len = contour.arc_length();
        if best.is_none_or(|(_, best_len)| len > best_len) {
            best = Some((contour, len));
        }
    }

    if let Some((contour, len)) = best {
        debug!(
            "centerline: picked {:?} contour with {} points, arc length {len:.1} (of {} candidates)",
            contour.kind,
            contour.len(),
            contours.len()
        );
    }
    best.map(|(contour, _)| contour)
}

#[cfg(test)]
mod tests {
    use tr_core::Point2i;

    use super::{Contour, ContourKind, select_centerline};

    fn line(n: i32, y: i32) -> Contour {
        Contour::new(
            (0..n).map(|x| Point2i::new(x, y)).collect(),
            ContourKind::Chain,
        )
    }

    #[test]
    fn empty_set_selects_nothing() {
        assert!(select_centerline(&[]).is_none());
    }

    #[test]
    fn longest_arc_wins() {
        let contours = vec![line(5, 0), line(12, 1), line(3, 2)];
        let best = select_centerline(&contours).expect("non-empty set");
        assert_eq!(best.points[0].y, 1);
        for c in &contours {
            assert!(best.arc_length() >= c.arc_length());
        }
    }

    #[test]
    fn arc_length_not_point_count_decides() {
        // Diagonal steps are longer than axis steps.
        let diagonal = Contour::new(
            (0..8).map(|i| Point2i::new(i, i)).collect(),
            ContourKind::Outer,
        );
        let dense = line(10, 20);
        let contours = vec![dense, diagonal];
        let best = select_centerline(&contours).expect("non-empty set");
        assert_eq!(best.kind, ContourKind::Outer);
    }

    #[test]
    fn ties_go_to_the_first_contour() {
        let contours = vec![line(6, 4), line(6, 9)];
        let best = select_centerline(&contours).expect("non-empty set");
        assert_eq!(best.points[0].y, 4);
    }

    #[test]
    fn single_point_contour_has_zero_length() {
        let c = Contour::new(vec![Point2i::new(3, 3)], ContourKind::Chain);
        assert_eq!(c.arc_length(), 0.0);
        assert_eq!(select_centerline(std::slice::from_ref(&c)), Some(&c));
    }
}
