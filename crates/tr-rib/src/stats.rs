use crate::extract::RibSegment;

/// Summary of a rib set, as reported next to the rendered overlay.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RibStats {
    pub count: usize,
    pub min_length: Option<f64>,
    pub mean_length: Option<f64>,
    pub max_length: Option<f64>,
    /// Ribs with at least one half cut by the length cap.
    pub truncated: usize,
}

impl RibStats {
    pub fn from_ribs(ribs: &[RibSegment]) -> Self {
        if ribs.is_empty() {
            return Self::default();
        }

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for rib in ribs {
            let len = rib.length();
            min = min.min(len);
            max = max.max(len);
            sum += len;
        }

        Self {
            count: ribs.len(),
            min_length: Some(min),
            mean_length: Some(sum / ribs.len() as f64),
            max_length: Some(max),
            truncated: ribs.iter().filter(|r| r.is_truncated()).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use tr_core::Point2i;

    use super::RibStats;
    use crate::extract::RibSegment;
    use crate::ray::RayStop;

    fn rib(len: i32, pos_stop: RayStop) -> RibSegment {
        RibSegment {
            sample_index: 0,
            origin: Point2i::new(0, 0),
            angle: 0.0,
            neg: Point2i::new(0, 0),
            pos: Point2i::new(len, 0),
            neg_stop: RayStop::Background,
            pos_stop,
        }
    }

    #[test]
    fn empty_set_has_no_lengths() {
        let s = RibStats::from_ribs(&[]);
        assert_eq!(s.count, 0);
        assert_eq!(s.mean_length, None);
        assert_eq!(s.truncated, 0);
    }

    #[test]
    fn summarizes_lengths_and_truncation() {
        let ribs = [
            rib(2, RayStop::Background),
            rib(6, RayStop::MaxLength),
            rib(4, RayStop::OutOfBounds),
        ];
        let s = RibStats::from_ribs(&ribs);
        assert_eq!(s.count, 3);
        assert_eq!(s.min_length, Some(2.0));
        assert_eq!(s.max_length, Some(6.0));
        assert_eq!(s.mean_length, Some(4.0));
        assert_eq!(s.truncated, 1);
    }
}
