//! 2D point type.

use super::Vec2;
use num_traits::Float;
use std::ops::{Add, Sub};

/// A 2D point in either input-pixel or output-plane coordinates.
///
/// Generic over floating-point types (`f32` or `f64`). Equality through
/// `PartialEq` is exact; use [`Point2::approx_eq`] when numerically
/// coincident points must compare equal.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point2<F> {
    pub x: F,
    pub y: F,
}

impl<F: Float> Point2<F> {
    /// Creates a new point.
    #[inline]
    pub fn new(x: F, y: F) -> Self {
        Self { x, y }
    }

    /// The origin `(0, 0)`.
    #[inline]
    pub fn origin() -> Self {
        Self {
            x: F::zero(),
            y: F::zero(),
        }
    }

    /// Squared Euclidean distance to another point.
    #[inline]
    pub fn distance_squared(self, other: Self) -> F {
        (self - other).magnitude_squared()
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance(self, other: Self) -> F {
        self.distance_squared(other).sqrt()
    }

    /// Returns the position vector of this point.
    #[inline]
    pub fn to_vec(self) -> Vec2<F> {
        Vec2::new(self.x, self.y)
    }

    /// Linearly interpolates between `self` and `other`.
    #[inline]
    pub fn lerp(self, other: Self, t: F) -> Self {
        self + (other - self) * t
    }

    /// Midpoint between `self` and `other`.
    #[inline]
    pub fn midpoint(self, other: Self) -> Self {
        let half = F::one() / (F::one() + F::one());
        self.lerp(other, half)
    }

    /// Largest absolute coordinate, used to scale relative tolerances.
    #[inline]
    pub fn magnitude_max(self) -> F {
        self.x.abs().max(self.y.abs())
    }

    /// Returns true if both coordinates are finite.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Tolerance-aware equality relative to coordinate magnitude.
    ///
    /// Each coordinate pair is compared with `epsilon * max(1, |a|, |b|)`, so
    /// small coordinates use an absolute bound and large ones a relative one.
    #[inline]
    pub fn approx_eq(self, other: Self, epsilon: F) -> bool {
        let close = |a: F, b: F| (a - b).abs() <= epsilon * F::one().max(a.abs()).max(b.abs());
        close(self.x, other.x) && close(self.y, other.y)
    }

    /// Equality within an absolute per-coordinate bound.
    #[inline]
    pub fn within(self, other: Self, abs_eps: F) -> bool {
        (self.x - other.x).abs() <= abs_eps && (self.y - other.y).abs() <= abs_eps
    }

    /// Returns the point as an `(x, y)` tuple.
    #[inline]
    pub fn to_tuple(self) -> (F, F) {
        (self.x, self.y)
    }
}

impl<F: Float> From<(F, F)> for Point2<F> {
    #[inline]
    fn from((x, y): (F, F)) -> Self {
        Self::new(x, y)
    }
}

impl<F: Float> From<[F; 2]> for Point2<F> {
    #[inline]
    fn from([x, y]: [F; 2]) -> Self {
        Self::new(x, y)
    }
}

impl<F: Float> Sub for Point2<F> {
    type Output = Vec2<F>;

    #[inline]
    fn sub(self, other: Self) -> Vec2<F> {
        Vec2::new(self.x - other.x, self.y - other.y)
    }
}

impl<F: Float> Add<Vec2<F>> for Point2<F> {
    type Output = Self;

    #[inline]
    fn add(self, v: Vec2<F>) -> Self {
        Self::new(self.x + v.x, self.y + v.y)
    }
}

impl<F: Float> Sub<Vec2<F>> for Point2<F> {
    type Output = Self;

    #[inline]
    fn sub(self, v: Vec2<F>) -> Self {
        Self::new(self.x - v.x, self.y - v.y)
    }
}

impl<F: Float> Default for Point2<F> {
    fn default() -> Self {
        Self::origin()
    }
}
