use core::f64::consts::FRAC_PI_2;

use tr_core::Point2i;

pub const DEFAULT_TANGENT_WINDOW: usize = 5;

/// Direction of travel at `points[index]`, in radians.
///
/// Uses the chord between `points[index - window]` and
/// `points[index + window]`, each clamped to the contour ends, so the
/// estimate is one-sided near the extremities.
///
/// # Panics
/// If `index >= points.len()`.
pub fn tangent_angle(points: &[Point2i], index: usize, window: usize) -> f64 {
    let n = points.len();
    assert!(index < n, "tangent sample index out of bounds");

    let i1 = index.saturating_sub(window);
    let i2 = index.saturating_add(window).min(n - 1);
    (points[i2] - points[i1]).angle()
}

/// Rib direction for a tangent: the `+90` degree normal. Rays run both ways
/// along it, so the `-90` degree normal is never needed.
pub fn perpendicular(tangent: f64) -> f64 {
    tangent + FRAC_PI_2
}
