//! Floating-point geometric primitives.

mod affine2;
mod point2;
mod vec2;

pub use affine2::Affine2;
pub use point2::Point2;
pub use vec2::Vec2;

use num_traits::Float;

/// Converts a numeric constant into `F`.
///
/// Every `Float` type can represent the small constants used in this crate
/// at least approximately, so the zero fallback is never taken in practice.
#[inline]
pub(crate) fn constant<F: Float, T: num_traits::ToPrimitive>(value: T) -> F {
    F::from(value).unwrap_or_else(F::zero)
}
