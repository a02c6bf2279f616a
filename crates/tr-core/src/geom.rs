use core::ops::{Add, Mul, Sub};

/// Integer pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point2i {
    pub x: i32,
    pub y: i32,
}

impl Point2i {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn to_f64(self) -> Point2d {
        Point2d {
            x: f64::from(self.x),
            y: f64::from(self.y),
        }
    }

    pub fn distance(self, other: Self) -> f64 {
        (other.to_f64() - self.to_f64()).norm()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2d {
    pub x: f64,
    pub y: f64,
}

impl Point2d {
    /// Maps a real position to the pixel containing it by truncating each
    /// coordinate toward zero.
    ///
    /// Values beyond the `i32` range saturate, which always lands outside any
    /// raster this crate can hold.
    pub fn truncate(self) -> Point2i {
        Point2i {
            x: self.x as i32,
            y: self.y as i32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2d {
    pub x: f64,
    pub y: f64,
}

impl Vec2d {
    /// Unit vector `(cos theta, sin theta)`.
    pub fn from_angle(theta: f64) -> Self {
        Self {
            x: theta.cos(),
            y: theta.sin(),
        }
    }

    pub fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y
    }

    pub fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Planar angle in radians, `atan2(y, x)`.
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }
}

impl Add<Vec2d> for Point2d {
    type Output = Point2d;

    fn add(self, rhs: Vec2d) -> Self::Output {
        Point2d {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub<Point2d> for Point2d {
    type Output = Vec2d;

    fn sub(self, rhs: Point2d) -> Self::Output {
        Vec2d {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Sub<Point2i> for Point2i {
    type Output = Vec2d;

    fn sub(self, rhs: Point2i) -> Self::Output {
        Vec2d {
            x: f64::from(self.x) - f64::from(rhs.x),
            y: f64::from(self.y) - f64::from(rhs.y),
        }
    }
}

impl Mul<f64> for Vec2d {
    type Output = Vec2d;

    fn mul(self, rhs: f64) -> Self::Output {
        Vec2d {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

/// Open polyline length: sum of consecutive Euclidean distances, without a
/// closing segment.
pub fn polyline_length(points: &[Point2i]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}
