//! Inversion of a tabulated forward map.

use super::bilinear::{BilinearCell, NewtonParams, NewtonSolution};
use super::grid::Pixmap;
use super::search::{
    affine_estimate, best_adjacent_cell, local_spacing, nearest_sample, scan_cells, walk,
    Located, WalkLimits,
};
use crate::error::{DrizzleError, Result};
use crate::primitives::{constant, Affine2, Point2};
use num_traits::Float;

/// Strategy used to find the cell containing a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CoarseSearch {
    /// Start from an affine estimate of the whole map and walk cell to
    /// cell. Falls back to [`CoarseSearch::Exhaustive`] when the walk fails.
    #[default]
    Walk,
    /// Scan every cell in row-major order.
    Exhaustive,
}

/// Configuration for [`PixmapInverter`].
///
/// # Example
///
/// ```
/// use drizzlemap::{CoarseSearch, InvertConfig};
///
/// let config: InvertConfig<f64> = InvertConfig::default()
///     .with_search(CoarseSearch::Exhaustive)
///     .with_max_extrapolation(0.5);
/// assert_eq!(config.max_iterations, 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InvertConfig<F> {
    /// Coarse localisation strategy.
    pub search: CoarseSearch,
    /// Newton iteration limit.
    pub max_iterations: usize,
    /// Newton residual tolerance in output units.
    pub tolerance: F,
    /// Relative threshold below which the cell Jacobian counts as singular.
    pub singular_epsilon: F,
    /// How far beyond the grid, in input pixels, a result may lie.
    pub max_extrapolation: F,
    /// Largest distance between the target and the nearest sample when no
    /// cell contains the target. `None` derives it from the local sample
    /// spacing as `(1 + max_extrapolation) * spacing`.
    pub search_radius: Option<F>,
    /// Step budget of the cell walk.
    pub max_walk_steps: usize,
    /// Largest cell jump per walk step and axis.
    pub max_jump: usize,
}

impl<F: Float> Default for InvertConfig<F> {
    fn default() -> Self {
        Self {
            search: CoarseSearch::Walk,
            max_iterations: 20,
            tolerance: constant(1e-6),
            singular_epsilon: constant(1e-12),
            max_extrapolation: F::one(),
            search_radius: None,
            max_walk_steps: 128,
            max_jump: 32,
        }
    }
}

impl<F: Float> InvertConfig<F> {
    /// Sets the coarse localisation strategy.
    pub fn with_search(mut self, search: CoarseSearch) -> Self {
        self.search = search;
        self
    }

    /// Sets the Newton iteration limit.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the Newton residual tolerance.
    pub fn with_tolerance(mut self, tolerance: F) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the singular-Jacobian threshold.
    pub fn with_singular_epsilon(mut self, singular_epsilon: F) -> Self {
        self.singular_epsilon = singular_epsilon;
        self
    }

    /// Sets how far beyond the grid a result may lie.
    pub fn with_max_extrapolation(mut self, max_extrapolation: F) -> Self {
        self.max_extrapolation = max_extrapolation;
        self
    }

    /// Sets a fixed search radius around the nearest sample.
    pub fn with_search_radius(mut self, search_radius: Option<F>) -> Self {
        self.search_radius = search_radius;
        self
    }

    /// Sets the walk step budget and per-step jump.
    pub fn with_walk_limits(mut self, max_walk_steps: usize, max_jump: usize) -> Self {
        self.max_walk_steps = max_walk_steps;
        self.max_jump = max_jump;
        self
    }

    fn newton_params(&self) -> NewtonParams<F> {
        NewtonParams {
            max_iterations: self.max_iterations,
            tolerance: self.tolerance,
            singular_epsilon: self.singular_epsilon,
        }
    }

    fn walk_limits(&self) -> WalkLimits {
        WalkLimits {
            max_steps: self.max_walk_steps,
            max_jump: self.max_jump.max(1),
        }
    }
}

/// Inverts a [`Pixmap`]: finds the input coordinate whose forward map is a
/// given output coordinate.
///
/// The inverter borrows the pixmap and precomputes an affine estimate of
/// the whole map. It holds no mutable state, so one inverter can serve many
/// threads.
///
/// # Example
///
/// ```
/// use drizzlemap::{InvertConfig, Pixmap, PixmapInverter, Point2};
///
/// let pixmap = Pixmap::from_fn(50, 40, |col, row| {
///     let (x, y) = (col as f64, row as f64);
///     Point2::new(2.0 * x + 0.001 * y * y, 2.0 * y - 0.3 * x)
/// })
/// .unwrap();
///
/// let inverter = PixmapInverter::new(&pixmap, InvertConfig::default());
/// let target = pixmap.map_point(Point2::new(12.3, 30.8)).unwrap();
/// let input = inverter.invert(target).unwrap();
/// assert!((input.x - 12.3).abs() < 1e-6 && (input.y - 30.8).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct PixmapInverter<'a, F> {
    pixmap: &'a Pixmap<F>,
    config: InvertConfig<F>,
    estimate: Option<Affine2<F>>,
}

impl<'a, F: Float> PixmapInverter<'a, F> {
    /// Prepares `pixmap` for repeated inversion.
    pub fn new(pixmap: &'a Pixmap<F>, config: InvertConfig<F>) -> Self {
        let estimate = affine_estimate(pixmap);
        if estimate.is_none() {
            log::debug!(
                "no affine estimate for {}x{} pixmap, walks start at the centre",
                pixmap.width(),
                pixmap.height()
            );
        }
        Self {
            pixmap,
            config,
            estimate,
        }
    }

    /// The pixmap being inverted.
    #[inline]
    pub fn pixmap(&self) -> &'a Pixmap<F> {
        self.pixmap
    }

    /// The active configuration.
    #[inline]
    pub fn config(&self) -> &InvertConfig<F> {
        &self.config
    }

    /// Input coordinate whose forward map is `target`.
    ///
    /// Fails with [`DrizzleError::Unreachable`] when the target maps outside
    /// the grid by more than `max_extrapolation` input pixels or lies too
    /// far from every sample, and with [`DrizzleError::NoValidSamples`] when
    /// the pixmap has no finite sample at all.
    pub fn invert(&self, target: Point2<F>) -> Result<Point2<F>> {
        if !target.is_finite() {
            return Err(unreachable(target));
        }
        let params = self.config.newton_params();

        let located = match self.config.search {
            CoarseSearch::Walk => self.walk(target, &params).or_else(|| {
                log::debug!(
                    "walk failed for target ({:.6}, {:.6}), scanning all cells",
                    as_f64(target.x),
                    as_f64(target.y)
                );
                scan_cells(self.pixmap, target, &params)
            }),
            CoarseSearch::Exhaustive => scan_cells(self.pixmap, target, &params),
        };

        match located {
            Some((cell, solution)) => self.finish(cell, solution, target),
            None => self.extrapolate(target, &params),
        }
    }

    fn walk(&self, target: Point2<F>, params: &NewtonParams<F>) -> Option<Located<F>> {
        let start = match &self.estimate {
            Some(estimate) => estimate.apply_point(target),
            None => {
                let half = constant::<F, _>(0.5);
                Point2::new(
                    constant::<F, _>(self.pixmap.width()) * half,
                    constant::<F, _>(self.pixmap.height()) * half,
                )
            }
        };
        walk(self.pixmap, start, target, params, self.config.walk_limits())
    }

    /// No cell contains the target: anchor on the nearest sample and
    /// extrapolate from the best adjacent cell.
    fn extrapolate(&self, target: Point2<F>, params: &NewtonParams<F>) -> Result<Point2<F>> {
        let (col, row, distance) = self.nearest_within_radius(target)?;
        log::debug!(
            "no cell contains target ({:.6}, {:.6}), extrapolating from sample ({col}, {row})",
            as_f64(target.x),
            as_f64(target.y)
        );

        match best_adjacent_cell(self.pixmap, col, row, target, params) {
            Some((cell, solution)) if solution.converged || solution.residual < distance => {
                self.within_margin(cell.to_input(solution.u, solution.v), target)
            }
            _ => {
                log::debug!("no usable cell around sample ({col}, {row}), returning the sample");
                Ok(grid_point(col, row))
            }
        }
    }

    /// Accepts a located cell, or falls back to the nearest grid point when
    /// the local solution did not converge and is worse than that point.
    fn finish(
        &self,
        cell: BilinearCell<F>,
        solution: NewtonSolution<F>,
        target: Point2<F>,
    ) -> Result<Point2<F>> {
        if solution.converged {
            return self.within_margin(cell.to_input(solution.u, solution.v), target);
        }

        let (col, row, distance) = self.nearest_within_radius(target)?;
        if solution.residual < distance {
            self.within_margin(cell.to_input(solution.u, solution.v), target)
        } else {
            log::debug!(
                "Newton did not converge in cell ({}, {}), returning sample ({col}, {row})",
                cell.col,
                cell.row
            );
            Ok(grid_point(col, row))
        }
    }

    /// Nearest valid sample, rejected when farther than the search radius.
    fn nearest_within_radius(&self, target: Point2<F>) -> Result<(usize, usize, F)> {
        let (col, row, distance) =
            nearest_sample(self.pixmap, target).ok_or(DrizzleError::NoValidSamples)?;

        let radius = match self.config.search_radius {
            Some(radius) => radius,
            None => local_spacing(self.pixmap, col, row)
                .map_or(F::zero(), |spacing| {
                    (F::one() + self.config.max_extrapolation) * spacing
                })
                .max(self.config.tolerance),
        };

        if distance > radius {
            log::debug!(
                "target ({:.6}, {:.6}) is {:.6} from the nearest sample, beyond radius {:.6}",
                as_f64(target.x),
                as_f64(target.y),
                as_f64(distance),
                as_f64(radius)
            );
            return Err(unreachable(target));
        }
        Ok((col, row, distance))
    }

    fn within_margin(&self, input: Point2<F>, target: Point2<F>) -> Result<Point2<F>> {
        let margin = self.config.max_extrapolation;
        let max_x = constant::<F, _>(self.pixmap.width() - 1) + margin;
        let max_y = constant::<F, _>(self.pixmap.height() - 1) + margin;
        let inside = input.x >= -margin && input.x <= max_x && input.y >= -margin && input.y <= max_y;
        if inside {
            Ok(input)
        } else {
            log::debug!(
                "target ({:.6}, {:.6}) maps to ({:.3}, {:.3}), outside the grid margin",
                as_f64(target.x),
                as_f64(target.y),
                as_f64(input.x),
                as_f64(input.y)
            );
            Err(unreachable(target))
        }
    }
}

/// Inverts `pixmap` at `target` with the default configuration.
///
/// Builds a fresh [`PixmapInverter`] per call; create one explicitly to
/// amortise its setup over many targets.
pub fn invert_pixmap<F: Float>(pixmap: &Pixmap<F>, target: Point2<F>) -> Result<Point2<F>> {
    invert_pixmap_with_config(pixmap, target, InvertConfig::default())
}

/// Inverts `pixmap` at `target` with an explicit configuration.
pub fn invert_pixmap_with_config<F: Float>(
    pixmap: &Pixmap<F>,
    target: Point2<F>,
    config: InvertConfig<F>,
) -> Result<Point2<F>> {
    PixmapInverter::new(pixmap, config).invert(target)
}

fn grid_point<F: Float>(col: usize, row: usize) -> Point2<F> {
    Point2::new(constant(col), constant(row))
}

fn unreachable<F: Float>(target: Point2<F>) -> DrizzleError {
    DrizzleError::Unreachable {
        x: as_f64(target.x),
        y: as_f64(target.y),
    }
}

#[inline]
fn as_f64<F: Float>(value: F) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Rotation, scaling and mild quadratic distortion about `(28, 34)`.
    fn distorted(x: f64, y: f64) -> Point2<f64> {
        let (x, y) = (x - 28.0, y - 34.0);
        let x2 = x + 2.4e-4 * x * x - 1.0e-5 * x * y + 3.1e-4 * y * y;
        let y2 = y + 1.2e-4 * x2 * x2 - 2.0e-5 * x2 * y + 1.1e-4 * y * y;
        Point2::new(
            2.0 * (0.78103169 * x2 + 0.66712321 * y2) + 100.0,
            2.0 * (-0.63246699 * x2 + 0.74091539 * y2) + 100.0,
        )
    }

    fn distorted_pixmap() -> Pixmap<f64> {
        Pixmap::from_fn(60, 50, |c, r| distorted(c as f64, r as f64)).unwrap()
    }

    fn assert_recovers(inverter: &PixmapInverter<'_, f64>, x: f64, y: f64, tol: f64) {
        let found = inverter.invert(distorted(x, y)).unwrap();
        assert_relative_eq!(found.x, x, epsilon = tol);
        assert_relative_eq!(found.y, y, epsilon = tol);
    }

    const PROBES: [(f64, f64); 10] = [
        (30.0, 20.0),
        (0.0, 0.0),
        (59.0, 49.0),
        (0.0, 49.0),
        (59.0, 0.0),
        (20.0, 0.0),
        (0.0, 21.9),
        (59.0, 21.6),
        (12.37, 44.81),
        (47.5, 3.25),
    ];

    #[test]
    fn test_round_trip_walk() {
        let pixmap = distorted_pixmap();
        let inverter = PixmapInverter::new(&pixmap, InvertConfig::default());
        for &(x, y) in &PROBES {
            assert_recovers(&inverter, x, y, 0.05);
        }
    }

    #[test]
    fn test_round_trip_exhaustive() {
        let pixmap = distorted_pixmap();
        let config = InvertConfig::default().with_search(CoarseSearch::Exhaustive);
        let inverter = PixmapInverter::new(&pixmap, config);
        for &(x, y) in &PROBES {
            assert_recovers(&inverter, x, y, 0.05);
        }
    }

    #[test]
    fn test_walk_and_exhaustive_agree() {
        let pixmap = distorted_pixmap();
        let walk = PixmapInverter::new(&pixmap, InvertConfig::default());
        let scan = PixmapInverter::new(
            &pixmap,
            InvertConfig::default().with_search(CoarseSearch::Exhaustive),
        );
        for k in 0..25 {
            let input = Point2::new(1.37 + 2.27 * k as f64, 0.71 + 1.93 * k as f64);
            let target = pixmap.map_point(input).unwrap();
            let a = walk.invert(target).unwrap();
            let b = scan.invert(target).unwrap();
            assert_relative_eq!(a.x, b.x, epsilon = 1e-5);
            assert_relative_eq!(a.y, b.y, epsilon = 1e-5);
            assert_relative_eq!(a.x, input.x, epsilon = 1e-5);
            assert_relative_eq!(a.y, input.y, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_affine_map_is_exact() {
        let t = Affine2::rotation(0.4).then(Affine2::scale_xy(1.7, 0.9)).then_translate(-20.0, 55.0);
        let pixmap = Pixmap::from_fn(30, 20, |c, r| t.apply_point(Point2::new(c as f64, r as f64))).unwrap();
        let inverse = t.inverse().unwrap();
        let inverter = PixmapInverter::new(&pixmap, InvertConfig::default());
        for &(x, y) in &[(3.3, 4.4), (29.0, 19.0), (0.0, 0.0), (14.5, 9.5)] {
            let target = t.apply_point(Point2::new(x, y));
            let found = inverter.invert(target).unwrap();
            let expected = inverse.apply_point(target);
            assert_relative_eq!(found.x, expected.x, epsilon = 1e-7);
            assert_relative_eq!(found.y, expected.y, epsilon = 1e-7);
        }
    }

    #[test]
    fn test_small_extrapolation_is_allowed() {
        let pixmap = distorted_pixmap();
        let inverter = PixmapInverter::new(&pixmap, InvertConfig::default());
        let target = pixmap.map_point(Point2::new(-0.4, 10.0)).unwrap();
        let found = inverter.invert(target).unwrap();
        assert_relative_eq!(found.x, -0.4, epsilon = 1e-6);
        assert_relative_eq!(found.y, 10.0, epsilon = 1e-6);
    }

    #[test]
    fn test_far_target_is_unreachable() {
        let pixmap = distorted_pixmap();
        for search in [CoarseSearch::Walk, CoarseSearch::Exhaustive] {
            let inverter = PixmapInverter::new(&pixmap, InvertConfig::default().with_search(search));
            let target = pixmap.map_point(Point2::new(-5.0, 10.0)).unwrap();
            assert!(matches!(inverter.invert(target), Err(DrizzleError::Unreachable { .. })));

            let way_off = Point2::new(1.0e6, -1.0e6);
            assert_eq!(
                inverter.invert(way_off),
                Err(DrizzleError::Unreachable {
                    x: 1.0e6,
                    y: -1.0e6
                })
            );
        }
    }

    #[test]
    fn test_margin_is_configurable() {
        let pixmap = distorted_pixmap();
        let target = pixmap.map_point(Point2::new(-2.0, 10.0)).unwrap();
        assert!(invert_pixmap(&pixmap, target).is_err());

        let config = InvertConfig::default().with_max_extrapolation(3.0);
        let found = invert_pixmap_with_config(&pixmap, target, config).unwrap();
        assert_relative_eq!(found.x, -2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_non_finite_target() {
        let pixmap = distorted_pixmap();
        let result = invert_pixmap(&pixmap, Point2::new(f64::NAN, 1.0));
        assert!(matches!(result, Err(DrizzleError::Unreachable { .. })));
    }

    #[test]
    fn test_no_valid_samples() {
        let pixmap = Pixmap::new(3, 2, vec![Point2::new(f64::NAN, f64::NAN); 6]).unwrap();
        assert_eq!(
            invert_pixmap(&pixmap, Point2::new(0.0, 0.0)),
            Err(DrizzleError::NoValidSamples)
        );
    }

    #[test]
    fn test_bad_samples_are_avoided() {
        let mut samples: Vec<Point2<f64>> = distorted_pixmap().samples().to_vec();
        samples[11 * 60 + 41] = Point2::new(f64::NAN, f64::NAN);
        let pixmap = Pixmap::new(60, 50, samples).unwrap();
        let inverter = PixmapInverter::new(&pixmap, InvertConfig::default());
        assert_recovers(&inverter, 15.2, 33.6, 0.05);
        // The four cells around the bad sample are unusable; the answer is
        // extrapolated from a neighbouring cell.
        assert_recovers(&inverter, 41.3, 11.2, 0.05);
    }

    #[test]
    fn test_single_sample_pixmap() {
        let pixmap = Pixmap::new(1, 1, vec![Point2::new(5.0, 5.0)]).unwrap();
        assert_eq!(invert_pixmap(&pixmap, Point2::new(5.0, 5.0)), Ok(Point2::new(0.0, 0.0)));
        assert!(invert_pixmap(&pixmap, Point2::new(5.5, 5.0)).is_err());
    }

    #[test]
    fn test_unconverged_solve_returns_nearest_grid_point() {
        let pixmap = distorted_pixmap();
        let target = distorted(7.9, 11.1);
        for search in [CoarseSearch::Walk, CoarseSearch::Exhaustive] {
            let config = InvertConfig::default()
                .with_search(search)
                .with_max_iterations(0);
            let found = invert_pixmap_with_config(&pixmap, target, config).unwrap();
            assert_eq!(found, Point2::new(8.0, 11.0));
        }

        // With iterations allowed the same target resolves to its input.
        let found = invert_pixmap(&pixmap, target).unwrap();
        assert_relative_eq!(found.x, 7.9, epsilon = 1e-4);
        assert_relative_eq!(found.y, 11.1, epsilon = 1e-4);
    }

    #[test]
    fn test_deterministic() {
        let pixmap = distorted_pixmap();
        let target = distorted(33.3, 17.7);
        let first = invert_pixmap(&pixmap, target).unwrap();
        for _ in 0..5 {
            assert_eq!(invert_pixmap(&pixmap, target).unwrap(), first);
        }
    }

    #[test]
    fn test_shared_across_threads() {
        let pixmap = distorted_pixmap();
        let inverter = PixmapInverter::new(&pixmap, InvertConfig::default());
        std::thread::scope(|scope| {
            for t in 0..4 {
                let inverter = &inverter;
                scope.spawn(move || {
                    for k in 0..10 {
                        let x = 2.0 + 5.0 * k as f64 + 0.25 * t as f64;
                        let y = 3.0 + 4.0 * k as f64;
                        assert_recovers(inverter, x, y, 0.05);
                    }
                });
            }
        });
    }

    #[test]
    fn test_f32_pixmap() {
        let pixmap: Pixmap<f32> =
            Pixmap::from_fn(20, 20, |c, r| Point2::new(1.5 * c as f32 + 3.0, 0.5 * r as f32 - 2.0)).unwrap();
        let config = InvertConfig::default().with_tolerance(1e-4);
        let found = invert_pixmap_with_config(&pixmap, Point2::new(10.5, 1.0), config).unwrap();
        assert!((found.x - 5.0).abs() < 1e-3);
        assert!((found.y - 6.0).abs() < 1e-3);
    }
}
