//! Coarse localisation of a target inside a pixmap.
//!
//! Two strategies find the cell whose bilinear patch contains the target:
//! a cell-to-cell walk steered by the local bilinear solution, and a
//! row-major scan of every cell. When no cell contains the target the
//! nearest valid sample anchors an extrapolation.

use super::bilinear::{unit_square_excess, BilinearCell, NewtonParams, NewtonSolution};
use super::grid::Pixmap;
use crate::primitives::{constant, Affine2, Point2};
use num_traits::Float;

/// A located cell and the local solution inside it.
pub(crate) type Located<F> = (BilinearCell<F>, NewtonSolution<F>);

/// How far outside `[0, 1]^2` a local solution may fall and still count as
/// inside the cell.
#[inline]
fn cell_slack<F: Float>() -> F {
    constant(1e-6)
}

#[inline]
fn centre<F: Float>() -> (F, F) {
    let half = constant(0.5);
    (half, half)
}

/// Output-to-input affine approximation fitted through three grid corners.
pub(crate) fn affine_estimate<F: Float>(pixmap: &Pixmap<F>) -> Option<Affine2<F>> {
    let last_col = pixmap.width().checked_sub(1)?;
    let last_row = pixmap.height().checked_sub(1)?;
    let forward = Affine2::from_axis_samples(
        Point2::origin(),
        constant(last_col),
        constant(last_row),
        pixmap.map_pixel(0, 0)?,
        pixmap.map_pixel(last_col, 0)?,
        pixmap.map_pixel(0, last_row)?,
    )?;
    forward.inverse()
}

/// Limits on the cell walk.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WalkLimits {
    pub max_steps: usize,
    pub max_jump: usize,
}

/// Walks from the cell containing input coordinate `start` towards the
/// cell containing `target`.
///
/// Each step solves the bilinear form of the current cell and moves by the
/// integer part of the solution, at most `max_jump` cells per axis. A walk
/// that cannot move further because it is pinned at the grid border returns
/// the border cell so the caller can extrapolate. Bad cells, singular
/// Jacobians and exhausted step budgets return `None`.
pub(crate) fn walk<F: Float>(
    pixmap: &Pixmap<F>,
    start: Point2<F>,
    target: Point2<F>,
    params: &NewtonParams<F>,
    limits: WalkLimits,
) -> Option<Located<F>> {
    let max_col = pixmap.width().checked_sub(2)?;
    let max_row = pixmap.height().checked_sub(2)?;
    let mut col = clamp_index(start.x, max_col);
    let mut row = clamp_index(start.y, max_row);

    for step in 0..limits.max_steps {
        let cell = pixmap.cell(col, row)?;
        let solution = cell.solve(target, centre(), params)?;
        log::trace!(
            "walk step {step}: cell ({col}, {row}), local ({:.4}, {:.4})",
            solution.u.to_f64().unwrap_or(f64::NAN),
            solution.v.to_f64().unwrap_or(f64::NAN)
        );

        if solution.converged && unit_square_excess(solution.u, solution.v) <= cell_slack() {
            return Some((cell, solution));
        }

        let next_col = step_index(col, solution.u, max_col, limits.max_jump);
        let next_row = step_index(row, solution.v, max_row, limits.max_jump);
        if next_col == col && next_row == row {
            return Some((cell, solution));
        }
        col = next_col;
        row = next_row;
    }

    None
}

/// Scans every cell in row-major order and returns the first one whose
/// bilinear patch contains `target`.
pub(crate) fn scan_cells<F: Float>(
    pixmap: &Pixmap<F>,
    target: Point2<F>,
    params: &NewtonParams<F>,
) -> Option<Located<F>> {
    let cols = pixmap.width().checked_sub(1)?;
    let rows = pixmap.height().checked_sub(1)?;

    for row in 0..rows {
        for col in 0..cols {
            let Some(cell) = pixmap.cell(col, row) else {
                continue;
            };
            if !cell
                .bounding_box()
                .inflated(params.tolerance)
                .contains_point(target)
            {
                continue;
            }
            let Some(solution) = cell.solve(target, centre(), params) else {
                continue;
            };
            if solution.converged && unit_square_excess(solution.u, solution.v) <= cell_slack() {
                return Some((cell, solution));
            }
        }
    }

    None
}

/// Nearest valid sample to `target` as `(col, row, distance)`.
///
/// Ties go to the first sample in row-major order.
pub(crate) fn nearest_sample<F: Float>(
    pixmap: &Pixmap<F>,
    target: Point2<F>,
) -> Option<(usize, usize, F)> {
    let mut best: Option<(usize, F)> = None;
    for (index, sample) in pixmap.samples().iter().enumerate() {
        if !sample.is_finite() {
            continue;
        }
        let d2 = sample.distance_squared(target);
        if best.map_or(true, |(_, b)| d2 < b) {
            best = Some((index, d2));
        }
    }
    let (index, d2) = best?;
    Some((index % pixmap.width(), index / pixmap.width(), d2.sqrt()))
}

/// Among the cells sharing sample `(col, row)`, the one whose local
/// solution lies closest to its unit square.
///
/// Converged solutions are preferred over non-converged ones.
pub(crate) fn best_adjacent_cell<F: Float>(
    pixmap: &Pixmap<F>,
    col: usize,
    row: usize,
    target: Point2<F>,
    params: &NewtonParams<F>,
) -> Option<Located<F>> {
    let mut best: Option<(Located<F>, F)> = None;

    for r in row.saturating_sub(1)..=row {
        for c in col.saturating_sub(1)..=col {
            let Some(cell) = pixmap.cell(c, r) else {
                continue;
            };
            let Some(solution) = cell.solve(target, centre(), params) else {
                continue;
            };
            let score = unit_square_excess(solution.u, solution.v);
            let better = match &best {
                None => true,
                Some(((_, current), current_score)) => {
                    (solution.converged && !current.converged)
                        || (solution.converged == current.converged && score < *current_score)
                }
            };
            if better {
                best = Some(((cell, solution), score));
            }
        }
    }

    best.map(|(located, _)| located)
}

/// Largest distance from sample `(col, row)` to its valid 4-neighbours.
pub(crate) fn local_spacing<F: Float>(pixmap: &Pixmap<F>, col: usize, row: usize) -> Option<F> {
    let centre = pixmap.map_pixel(col, row)?;
    let neighbours = [
        col.checked_sub(1).map(|c| (c, row)),
        Some((col + 1, row)),
        row.checked_sub(1).map(|r| (col, r)),
        Some((col, row + 1)),
    ];

    neighbours
        .into_iter()
        .flatten()
        .filter_map(|(c, r)| pixmap.map_pixel(c, r))
        .map(|p| p.distance(centre))
        .fold(None, |acc: Option<F>, d| Some(acc.map_or(d, |a| a.max(d))))
}

/// Cell index containing `coord`, clamped to `0..=max`.
fn clamp_index<F: Float>(coord: F, max: usize) -> usize {
    if !coord.is_finite() {
        return max / 2;
    }
    let clamped = coord.floor().max(F::zero()).min(constant(max));
    clamped.to_usize().unwrap_or(0)
}

/// Moves `index` by the integer part of the local coordinate `t`.
fn step_index<F: Float>(index: usize, t: F, max: usize, max_jump: usize) -> usize {
    let jump = constant::<F, _>(max_jump);
    let delta = t.floor().max(-jump).min(jump).to_i64().unwrap_or(0);
    let moved = index as i64 + delta;
    moved.clamp(0, max as i64) as usize
}
