//! 2D affine transformation type.

use super::{Point2, Vec2};
use num_traits::Float;

/// A 2D affine transformation matrix.
///
/// Represented as a 2x3 matrix in row-major order:
/// ```text
/// | a  b  tx |
/// | c  d  ty |
/// ```
///
/// Points map as `(a*x + b*y + tx, c*x + d*y + ty)`. The pixmap inverter uses
/// an affine approximation of the whole forward map to pick its starting
/// cell; tests use it to build exactly-invertible pixmaps.
///
/// # Example
///
/// ```
/// use drizzlemap::primitives::{Affine2, Point2};
/// use std::f64::consts::FRAC_PI_2;
///
/// let transform: Affine2<f64> = Affine2::rotation(FRAC_PI_2).then_translate(10.0, 0.0);
/// let p = transform.apply_point(Point2::new(1.0, 0.0));
/// assert!((p.x - 10.0).abs() < 1e-12 && (p.y - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Affine2<F> {
    pub a: F,
    pub b: F,
    pub c: F,
    pub d: F,
    pub tx: F,
    pub ty: F,
}

impl<F: Float> Affine2<F> {
    /// Creates a new affine transform from matrix components.
    #[inline]
    pub fn new(a: F, b: F, c: F, d: F, tx: F, ty: F) -> Self {
        Self { a, b, c, d, tx, ty }
    }

    /// The identity transform.
    #[inline]
    pub fn identity() -> Self {
        Self::new(
            F::one(),
            F::zero(),
            F::zero(),
            F::one(),
            F::zero(),
            F::zero(),
        )
    }

    /// Rotation around the origin, counter-clockwise, in radians.
    #[inline]
    pub fn rotation(angle: F) -> Self {
        let (sin_a, cos_a) = angle.sin_cos();
        Self::new(cos_a, -sin_a, sin_a, cos_a, F::zero(), F::zero())
    }

    /// Non-uniform scaling around the origin.
    #[inline]
    pub fn scale_xy(sx: F, sy: F) -> Self {
        Self::new(sx, F::zero(), F::zero(), sy, F::zero(), F::zero())
    }

    /// Builds the affine map that sends three reference points to three images.
    ///
    /// `origin` maps to `origin_image`, `origin + du` to `u_image` and
    /// `origin + dv` to `v_image`, where `du` is along x and `dv` along y.
    /// Returns `None` when `du` or `dv` is zero.
    pub fn from_axis_samples(
        origin: Point2<F>,
        du: F,
        dv: F,
        origin_image: Point2<F>,
        u_image: Point2<F>,
        v_image: Point2<F>,
    ) -> Option<Self> {
        if du == F::zero() || dv == F::zero() {
            return None;
        }
        let col_u = (u_image - origin_image) / du;
        let col_v = (v_image - origin_image) / dv;
        let linear = Self::new(col_u.x, col_v.x, col_u.y, col_v.y, F::zero(), F::zero());
        let shifted = linear.apply_point(origin);
        Some(Self {
            tx: origin_image.x - shifted.x,
            ty: origin_image.y - shifted.y,
            ..linear
        })
    }

    /// Applies this transform to a point.
    #[inline]
    pub fn apply_point(&self, p: Point2<F>) -> Point2<F> {
        Point2::new(
            self.a * p.x + self.b * p.y + self.tx,
            self.c * p.x + self.d * p.y + self.ty,
        )
    }

    /// Applies the linear part to a vector.
    #[inline]
    pub fn apply_vec(&self, v: Vec2<F>) -> Vec2<F> {
        Vec2::new(self.a * v.x + self.b * v.y, self.c * v.x + self.d * v.y)
    }

    /// Composes this transform with another (self * other).
    ///
    /// The resulting transform applies `other` first, then `self`.
    pub fn compose(&self, other: &Self) -> Self {
        Self {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            tx: self.a * other.tx + self.b * other.ty + self.tx,
            ty: self.c * other.tx + self.d * other.ty + self.ty,
        }
    }

    /// Returns a transform that applies `self` first, then `other`.
    #[inline]
    pub fn then(&self, other: Self) -> Self {
        other.compose(self)
    }

    /// Returns a transform that applies `self` first, then translates.
    #[inline]
    pub fn then_translate(&self, dx: F, dy: F) -> Self {
        Self {
            tx: self.tx + dx,
            ty: self.ty + dy,
            ..*self
        }
    }

    /// Determinant of the linear part.
    #[inline]
    pub fn determinant(&self) -> F {
        self.a * self.d - self.b * self.c
    }

    /// Returns the inverse transform, if it exists.
    ///
    /// The transform counts as singular when the determinant is negligible
    /// relative to the magnitude of its columns.
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        let scale = (self.a.abs() + self.c.abs()) * (self.b.abs() + self.d.abs());
        if !det.is_finite() || det.abs() <= F::epsilon() * scale || det == F::zero() {
            return None;
        }

        let inv_det = F::one() / det;
        Some(Self {
            a: self.d * inv_det,
            b: -self.b * inv_det,
            c: -self.c * inv_det,
            d: self.a * inv_det,
            tx: (self.b * self.ty - self.d * self.tx) * inv_det,
            ty: (self.c * self.tx - self.a * self.ty) * inv_det,
        })
    }
}

impl<F: Float> Default for Affine2<F> {
    fn default() -> Self {
        Self::identity()
    }
}
