//! Epsilon-aware predicates and vertex cleanup.
//!
//! All functions in this module take explicit tolerance parameters. The
//! [`Tolerance`] type carries the single relative epsilon that the clipper
//! turns into one absolute bound per call.

mod predicates;
mod weld;

use crate::primitives::Point2;
use num_traits::Float;

pub use predicates::{
    classify_distance, is_between, orient2d, signed_distance_to_line, Orientation, Side,
};
pub use weld::{remove_collinear_vertices, remove_duplicate_vertices};

pub(crate) use weld::{dedup_ring, drop_collinear_ring};

/// Relative tolerance used for coincidence and side tests.
///
/// The absolute bound for a computation is `epsilon * max(1, scale)`, where
/// `scale` is the largest coordinate magnitude involved. Coordinates near the
/// origin therefore compare with an absolute `epsilon`, large coordinates
/// with a relative one.
///
/// # Example
///
/// ```
/// use drizzlemap::tolerance::Tolerance;
///
/// let tol: Tolerance<f64> = Tolerance::default();
/// assert_eq!(tol.epsilon, 1e-8);
/// assert!((tol.absolute(1000.0) - 1e-5).abs() < 1e-18);
/// assert_eq!(tol.absolute(0.25), 1e-8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tolerance<F> {
    /// Relative epsilon.
    pub epsilon: F,
}

impl<F: Float> Tolerance<F> {
    /// Creates a tolerance with the given relative epsilon.
    #[inline]
    pub fn new(epsilon: F) -> Self {
        Self { epsilon }
    }

    /// Returns a copy with a different relative epsilon.
    #[inline]
    pub fn with_epsilon(mut self, epsilon: F) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Absolute bound for coordinates of magnitude up to `scale`.
    #[inline]
    pub fn absolute(&self, scale: F) -> F {
        self.epsilon * F::one().max(scale.abs())
    }

    /// Absolute bound for a set of points, scaled by their largest coordinate.
    pub fn absolute_for<'a, I>(&self, points: I) -> F
    where
        I: IntoIterator<Item = &'a Point2<F>>,
        F: 'a,
    {
        let scale = points
            .into_iter()
            .fold(F::zero(), |acc, p| acc.max(p.magnitude_max()));
        self.absolute(scale)
    }
}

impl<F: Float> Default for Tolerance<F> {
    /// `1e-8`, or 64 machine epsilons when the float type cannot resolve that.
    fn default() -> Self {
        let floor = F::epsilon() * F::from(64.0).unwrap_or_else(F::one);
        let eps = F::from(1e-8).unwrap_or(floor);
        Self {
            epsilon: eps.max(floor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_f64() {
        let tol: Tolerance<f64> = Tolerance::default();
        assert_eq!(tol.epsilon, 1e-8);
    }

    #[test]
    fn test_default_f32_is_resolvable() {
        let tol: Tolerance<f32> = Tolerance::default();
        assert!(tol.epsilon > f32::EPSILON);
        assert!(1.0_f32 + tol.epsilon > 1.0);
    }

    #[test]
    fn test_absolute_for_points() {
        let tol = Tolerance::new(1e-8_f64);
        let pts = [Point2::new(0.5, -3000.0), Point2::new(20.0, 1.0)];
        assert!((tol.absolute_for(&pts) - 3e-5).abs() < 1e-18);
        let empty: [Point2<f64>; 0] = [];
        assert_eq!(tol.absolute_for(&empty), 1e-8);
    }

    #[test]
    fn test_with_epsilon() {
        let tol = Tolerance::<f64>::default().with_epsilon(1e-6);
        assert_eq!(tol.epsilon, 1e-6);
    }
}
