use tr_core::{ImageView, Point2i, Vec2d};

/// Distance advanced per march step, in pixels.
pub const RAY_STEP: f64 = 1.0;

/// Why a half-ray stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RayStop {
    /// The next step landed on a background pixel.
    Background,
    /// The next step left the raster.
    OutOfBounds,
    /// The length cap was reached while still on track.
    MaxLength,
}

impl RayStop {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::OutOfBounds => "out_of_bounds",
            Self::MaxLength => "max_length",
        }
    }
}

/// Both halves of a ray cast through one origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Endpoint on the `-direction` side.
    pub neg: Point2i,
    /// Endpoint on the `+direction` side.
    pub pos: Point2i,
    pub neg_stop: RayStop,
    pub pos_stop: RayStop,
    /// Marched distance on each side, always a whole number of steps.
    pub neg_length: f64,
    pub pos_length: f64,
}

/// Marches from `origin` along `sign * dir` and returns the distance reached
/// together with the stop reason.
///
/// The pixel at distance `d` is `truncate(origin + dir * (sign * d))`. The
/// origin pixel itself is never tested.
pub fn march(
    mask: &ImageView<'_, u8>,
    origin: Point2i,
    dir: Vec2d,
    sign: f64,
    max_length: f64,
) -> (f64, RayStop) {
    let start = origin.to_f64();
    let mut length = 0.0;
    while length < max_length {
        length += RAY_STEP;
        let p = (start + dir * (sign * length)).truncate();
        match mask.get_signed(p) {
            None => return (length - RAY_STEP, RayStop::OutOfBounds),
            Some(&0) => return (length - RAY_STEP, RayStop::Background),
            Some(_) => {}
        }
    }
    (length, RayStop::MaxLength)
}

/// Casts a ray through `origin` at `angle` (radians) in both directions.
pub fn cast_ray(mask: &ImageView<'_, u8>, origin: Point2i, angle: f64, max_length: f64) -> RayHit {
    let dir = Vec2d::from_angle(angle);
    let start = origin.to_f64();

    let (neg_length, neg_stop) = march(mask, origin, dir, -1.0, max_length);
    let (pos_length, pos_stop) = march(mask, origin, dir, 1.0, max_length);

    RayHit {
        neg: (start + dir * -neg_length).truncate(),
        pos: (start + dir * pos_length).truncate(),
        neg_stop,
        pos_stop,
        neg_length,
        pos_length,
    }
}

#[cfg(test)]
mod tests {
    use core::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    use tr_core::{Image, Point2i};

    use super::{RayStop, cast_ray};

    /// Horizontal band of track covering rows `5..=15`.
    fn stripe(width: usize, height: usize) -> Image<u8> {
        Image::from_fn(width, height, |_, y| if (5..=15).contains(&y) { 255 } else { 0 })
    }

    #[test]
    fn cap_stops_both_halves_symmetrically() {
        let mask = stripe(40, 21);
        let hit = cast_ray(&mask.as_view(), Point2i::new(20, 10), FRAC_PI_2, 3.0);

        assert_eq!(hit.neg, Point2i::new(20, 7));
        assert_eq!(hit.pos, Point2i::new(20, 13));
        assert_eq!(hit.neg_stop, RayStop::MaxLength);
        assert_eq!(hit.pos_stop, RayStop::MaxLength);
        assert_eq!(hit.neg_length, 3.0);
        assert_eq!(hit.pos_length, 3.0);
    }

    #[test]
    fn origin_next_to_edge_stays_within_one_step() {
        let mask = stripe(40, 21);
        let origin = Point2i::new(20, 14);

        let hit = cast_ray(&mask.as_view(), origin, FRAC_PI_2, 20.0);
        assert_eq!(hit.pos, Point2i::new(20, 15));
        assert_eq!(hit.pos_stop, RayStop::Background);
        assert_eq!(hit.pos_length, 1.0);
        assert_eq!(hit.neg, Point2i::new(20, 5));
        assert_eq!(hit.neg_stop, RayStop::Background);

        let capped = cast_ray(&mask.as_view(), origin, FRAC_PI_2, 4.0);
        assert_eq!(capped.neg, Point2i::new(20, 10));
        assert_eq!(capped.neg_stop, RayStop::MaxLength);
    }

    #[test]
    fn raster_edge_stops_with_out_of_bounds() {
        let mask = Image::new_fill(20, 12, 1u8);
        let origin = Point2i::new(10, 11);

        let hit = cast_ray(&mask.as_view(), origin, FRAC_PI_2, 50.0);
        assert_eq!(hit.pos, origin);
        assert_eq!(hit.pos_length, 0.0);
        assert_eq!(hit.pos_stop, RayStop::OutOfBounds);
        assert_eq!(hit.neg, Point2i::new(10, 0));
        assert_eq!(hit.neg_stop, RayStop::OutOfBounds);
    }

    #[test]
    fn isolated_origin_gives_zero_length_rib() {
        let mut mask = Image::new_fill(9, 9, 0u8);
        mask.data_mut()[4 * 9 + 4] = 255;
        let origin = Point2i::new(4, 4);

        for angle in [0.0, FRAC_PI_4, FRAC_PI_2, PI] {
            let hit = cast_ray(&mask.as_view(), origin, angle, 10.0);
            assert_eq!(hit.neg, origin);
            assert_eq!(hit.pos, origin);
            assert_eq!(hit.neg_stop, RayStop::Background);
            assert_eq!(hit.pos_stop, RayStop::Background);
        }
    }

    #[test]
    fn fractional_cap_rounds_up_to_whole_step() {
        let mask = Image::new_fill(30, 30, 1u8);
        let hit = cast_ray(&mask.as_view(), Point2i::new(15, 15), 0.0, 2.5);
        assert_eq!(hit.pos_length, 3.0);
        assert_eq!(hit.pos, Point2i::new(18, 15));
        assert_eq!(hit.neg, Point2i::new(12, 15));
    }

    #[test]
    fn zero_cap_returns_origin() {
        let mask = Image::new_fill(5, 5, 1u8);
        let hit = cast_ray(&mask.as_view(), Point2i::new(2, 2), 1.0, 0.0);
        assert_eq!(hit.neg, Point2i::new(2, 2));
        assert_eq!(hit.pos, Point2i::new(2, 2));
        assert_eq!(hit.pos_stop, RayStop::MaxLength);
    }

    #[test]
    fn endpoints_are_in_bounds_on_track_or_origin() {
        let (w, h) = (48usize, 40usize);
        let mask = Image::from_fn(w, h, |x, y| {
            let dx = x as f64 - 24.0;
            let dy = y as f64 - 20.0;
            let r = (dx * dx + dy * dy).sqrt();
            u8::from((8.0..17.0).contains(&r))
        });
        let view = mask.as_view();

        for oy in (0..h as i32).step_by(3) {
            for ox in (0..w as i32).step_by(3) {
                let origin = Point2i::new(ox, oy);
                for k in 0..16 {
                    let angle = f64::from(k) * PI / 8.0;
                    let hit = cast_ray(&view, origin, angle, 12.0);
                    for p in [hit.neg, hit.pos] {
                        assert!(view.get_signed(p).is_some(), "{p:?} outside raster");
                        assert!(view.is_set(p) || p == origin, "{p:?} from {origin:?} at {angle}");
                    }
                    assert!(hit.neg_length <= 12.0 && hit.pos_length <= 12.0);
                }
            }
        }
    }

    #[test]
    fn casting_is_deterministic() {
        let mask = stripe(40, 21);
        let a = cast_ray(&mask.as_view(), Point2i::new(17, 9), 1.1, 30.0);
        let b = cast_ray(&mask.as_view(), Point2i::new(17, 9), 1.1, 30.0);
        assert_eq!(a, b);
    }
}
