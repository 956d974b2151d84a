//! Bilinear interpolation within one pixmap cell and its Newton inverse.

use crate::bounds::Aabb2;
use crate::primitives::{Point2, Vec2};
use num_traits::Float;

/// Four forward-mapped corners of a grid cell.
///
/// Local coordinates `(u, v)` in `[0, 1]^2` cover the cell; input pixel
/// coordinates are `(col + u, row + v)`. Values outside the unit square
/// extrapolate the same bilinear form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BilinearCell<F> {
    /// Column of the `(0, 0)` corner.
    pub col: usize,
    /// Row of the `(0, 0)` corner.
    pub row: usize,
    /// Corners at `(0,0)`, `(1,0)`, `(0,1)` and `(1,1)`.
    pub corners: [Point2<F>; 4],
}

/// Outcome of a Newton solve inside a cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonSolution<F> {
    pub u: F,
    pub v: F,
    /// Distance between the mapped solution and the target.
    pub residual: F,
    pub iterations: usize,
    /// True when `residual` reached the requested tolerance.
    pub converged: bool,
}

/// Parameters of the Newton iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonParams<F> {
    pub max_iterations: usize,
    /// Residual tolerance in output units.
    pub tolerance: F,
    /// The Jacobian is singular when `|det J| <= singular_epsilon * |e_u| |e_v|`.
    pub singular_epsilon: F,
}

impl<F: Float> BilinearCell<F> {
    /// Creates a cell from its corners in `(0,0), (1,0), (0,1), (1,1)` order.
    #[inline]
    pub fn new(col: usize, row: usize, corners: [Point2<F>; 4]) -> Self {
        Self { col, row, corners }
    }

    /// Input pixel coordinate of local `(u, v)`.
    #[inline]
    pub fn to_input(&self, u: F, v: F) -> Point2<F> {
        let col = F::from(self.col).unwrap_or_else(F::zero);
        let row = F::from(self.row).unwrap_or_else(F::zero);
        Point2::new(col + u, row + v)
    }

    /// Forward map at local `(u, v)`.
    #[inline]
    pub fn eval(&self, u: F, v: F) -> Point2<F> {
        let (a, b, c) = self.coefficients();
        self.corners[0] + a * u + b * v + c * (u * v)
    }

    /// Partial derivatives `(d/du, d/dv)` of the forward map at `(u, v)`.
    #[inline]
    pub fn jacobian(&self, u: F, v: F) -> (Vec2<F>, Vec2<F>) {
        let (a, b, c) = self.coefficients();
        (a + c * v, b + c * u)
    }

    /// Bounding box of the four corners.
    pub fn bounding_box(&self) -> Aabb2<F> {
        let first = Aabb2::new(self.corners[0], self.corners[0]);
        self.corners[1..]
            .iter()
            .fold(first, |aabb, &p| aabb.expand_to_include(p))
    }

    /// Solves `eval(u, v) == target` by Newton-Raphson from `(u0, v0)`.
    ///
    /// Returns `None` when the Jacobian becomes singular or the iterate
    /// stops being finite. A solution that exhausts `max_iterations` is
    /// returned with `converged == false`.
    pub fn solve(
        &self,
        target: Point2<F>,
        start: (F, F),
        params: &NewtonParams<F>,
    ) -> Option<NewtonSolution<F>> {
        let (mut u, mut v) = start;

        for iteration in 0..params.max_iterations {
            let r = target - self.eval(u, v);
            let residual = r.magnitude();
            if !residual.is_finite() {
                return None;
            }
            if residual <= params.tolerance {
                return Some(NewtonSolution {
                    u,
                    v,
                    residual,
                    iterations: iteration,
                    converged: true,
                });
            }

            let (eu, ev) = self.jacobian(u, v);
            let det = eu.cross(ev);
            if det == F::zero()
                || det.abs() <= params.singular_epsilon * eu.magnitude() * ev.magnitude()
            {
                return None;
            }

            u = u + r.cross(ev) / det;
            v = v + eu.cross(r) / det;
            if !u.is_finite() || !v.is_finite() {
                return None;
            }
        }

        let residual = (target - self.eval(u, v)).magnitude();
        if !residual.is_finite() {
            return None;
        }
        Some(NewtonSolution {
            u,
            v,
            residual,
            iterations: params.max_iterations,
            converged: residual <= params.tolerance,
        })
    }

    /// `a = p10 - p00`, `b = p01 - p00`, `c = p11 - p10 - p01 + p00`.
    #[inline]
    fn coefficients(&self) -> (Vec2<F>, Vec2<F>, Vec2<F>) {
        let [p00, p10, p01, p11] = self.corners;
        let a = p10 - p00;
        let b = p01 - p00;
        let c = (p11 - p10) - (p01 - p00);
        (a, b, c)
    }
}

/// Distance of `(u, v)` from the unit square, zero inside it.
#[inline]
pub(crate) fn unit_square_excess<F: Float>(u: F, v: F) -> F {
    let du = (-u).max(u - F::one()).max(F::zero());
    let dv = (-v).max(v - F::one()).max(F::zero());
    du.max(dv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params() -> NewtonParams<f64> {
        NewtonParams {
            max_iterations: 20,
            tolerance: 1e-10,
            singular_epsilon: 1e-12,
        }
    }

    fn warped() -> BilinearCell<f64> {
        BilinearCell::new(
            3,
            7,
            [
                Point2::new(0.0, 0.0),
                Point2::new(2.0, 0.3),
                Point2::new(-0.2, 1.5),
                Point2::new(2.4, 2.1),
            ],
        )
    }

    #[test]
    fn test_eval_corners() {
        let cell = warped();
        for (k, &(u, v)) in [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)].iter().enumerate() {
            let p = cell.eval(u, v);
            assert_relative_eq!(p.x, cell.corners[k].x, epsilon = 1e-12);
            assert_relative_eq!(p.y, cell.corners[k].y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_jacobian_matches_finite_difference() {
        let cell = warped();
        let (u, v, h) = (0.3, 0.6, 1e-6);
        let (eu, ev) = cell.jacobian(u, v);
        let du = (cell.eval(u + h, v) - cell.eval(u - h, v)) / (2.0 * h);
        let dv = (cell.eval(u, v + h) - cell.eval(u, v - h)) / (2.0 * h);
        assert_relative_eq!(eu.x, du.x, epsilon = 1e-8);
        assert_relative_eq!(eu.y, du.y, epsilon = 1e-8);
        assert_relative_eq!(ev.x, dv.x, epsilon = 1e-8);
        assert_relative_eq!(ev.y, dv.y, epsilon = 1e-8);
    }

    #[test]
    fn test_solve_recovers_interior_point() {
        let cell = warped();
        for &(u, v) in &[(0.25, 0.75), (0.5, 0.5), (0.9, 0.1), (0.0, 1.0)] {
            let target = cell.eval(u, v);
            let sol = cell.solve(target, (0.5, 0.5), &params()).unwrap();
            assert!(sol.converged);
            assert_relative_eq!(sol.u, u, epsilon = 1e-9);
            assert_relative_eq!(sol.v, v, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_solve_extrapolates() {
        let cell = warped();
        let target = cell.eval(1.2, -0.15);
        let sol = cell.solve(target, (0.5, 0.5), &params()).unwrap();
        assert!(sol.converged);
        assert_relative_eq!(sol.u, 1.2, epsilon = 1e-9);
        assert_relative_eq!(sol.v, -0.15, epsilon = 1e-9);
        assert!(unit_square_excess(sol.u, sol.v) > 0.19);
    }

    #[test]
    fn test_solve_singular_cell() {
        let p = Point2::new(1.0, 1.0);
        let collapsed = BilinearCell::new(0, 0, [p, Point2::new(2.0, 2.0), p, Point2::new(2.0, 2.0)]);
        assert!(collapsed.solve(Point2::new(1.5, 1.0), (0.5, 0.5), &params()).is_none());
    }

    #[test]
    fn test_to_input_offsets_by_origin() {
        let p = warped().to_input(0.25, 0.5);
        assert_eq!(p, Point2::new(3.25, 7.5));
    }

    #[test]
    fn test_unit_square_excess() {
        assert_eq!(unit_square_excess(0.5, 0.5), 0.0);
        assert_eq!(unit_square_excess(1.0, 0.0), 0.0);
        assert_relative_eq!(unit_square_excess(-0.25, 0.5), 0.25);
        assert_relative_eq!(unit_square_excess(0.5, 1.75), 0.75);
    }
}
