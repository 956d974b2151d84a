//! Dense tabulated forward map.

use super::bilinear::BilinearCell;
use crate::error::{DrizzleError, Result};
use crate::primitives::{constant, Point2};
use num_traits::Float;

/// A dense `height x width` grid of forward-mapped coordinates.
///
/// The sample at `(row, col)` is the output-plane position of input pixel
/// `(col, row)`. Samples with a non-finite coordinate are "bad" and never
/// used for interpolation.
///
/// # Example
///
/// ```
/// use drizzlemap::{Pixmap, Point2};
///
/// // Shift by (10, 20).
/// let pixmap = Pixmap::from_fn(4, 3, |col, row| {
///     Point2::new(col as f64 + 10.0, row as f64 + 20.0)
/// })
/// .unwrap();
///
/// assert_eq!(pixmap.shape(), (3, 4));
/// assert_eq!(pixmap.map_pixel(1, 2), Some(Point2::new(11.0, 22.0)));
/// let p = pixmap.map_point(Point2::new(0.5, 0.25)).unwrap();
/// assert!((p.x - 10.5).abs() < 1e-12 && (p.y - 20.25).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Pixmap<F> {
    width: usize,
    height: usize,
    samples: Vec<Point2<F>>,
}

impl<F: Float> Pixmap<F> {
    /// Creates a pixmap from row-major samples.
    pub fn new(width: usize, height: usize, samples: Vec<Point2<F>>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(DrizzleError::EmptyPixmap);
        }
        if width.checked_mul(height) != Some(samples.len()) {
            return Err(DrizzleError::ShapeMismatch {
                width,
                height,
                len: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// Creates a pixmap by evaluating `f(col, row)` for every input pixel.
    pub fn from_fn<M>(width: usize, height: usize, mut f: M) -> Result<Self>
    where
        M: FnMut(usize, usize) -> Point2<F>,
    {
        let mut samples = Vec::with_capacity(width.saturating_mul(height));
        for row in 0..height {
            for col in 0..width {
                samples.push(f(col, row));
            }
        }
        Self::new(width, height, samples)
    }

    /// Number of columns.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// `(height, width)`, matching row-major array conventions.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// All samples in row-major order.
    #[inline]
    pub fn samples(&self) -> &[Point2<F>] {
        &self.samples
    }

    /// Raw sample at `(row, col)`, bad or not.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<Point2<F>> {
        if row < self.height && col < self.width {
            Some(self.samples[row * self.width + col])
        } else {
            None
        }
    }

    /// Returns true if input pixel `(col, row)` is outside the grid or has a
    /// non-finite sample.
    #[inline]
    pub fn is_bad(&self, col: usize, row: usize) -> bool {
        self.get(row, col).map_or(true, |p| !p.is_finite())
    }

    /// Forward-mapped position of input pixel `(col, row)`.
    ///
    /// `None` when the pixel is outside the grid or its sample is bad.
    #[inline]
    pub fn map_pixel(&self, col: usize, row: usize) -> Option<Point2<F>> {
        self.get(row, col).filter(|p| p.is_finite())
    }

    /// Forward map at a fractional input coordinate by bilinear
    /// interpolation.
    ///
    /// Coordinates outside the grid extrapolate from the nearest border
    /// cell. A grid with a single row or column is constant across it.
    /// Returns `None` if any sample involved is bad.
    pub fn map_point(&self, input: Point2<F>) -> Option<Point2<F>> {
        if !input.is_finite() {
            return None;
        }
        let (col, u) = Self::axis_cell(input.x, self.width)?;
        let (row, v) = Self::axis_cell(input.y, self.height)?;
        let col1 = (col + 1).min(self.width - 1);
        let row1 = (row + 1).min(self.height - 1);

        let cell = BilinearCell::new(
            col,
            row,
            [
                self.map_pixel(col, row)?,
                self.map_pixel(col1, row)?,
                self.map_pixel(col, row1)?,
                self.map_pixel(col1, row1)?,
            ],
        );
        Some(cell.eval(u, v))
    }

    /// The bilinear cell spanned by input pixels `(col, row)` and
    /// `(col + 1, row + 1)`.
    ///
    /// `None` when the cell leaves the grid or a corner sample is bad.
    pub fn cell(&self, col: usize, row: usize) -> Option<BilinearCell<F>> {
        if col + 1 >= self.width || row + 1 >= self.height {
            return None;
        }
        Some(BilinearCell::new(
            col,
            row,
            [
                self.map_pixel(col, row)?,
                self.map_pixel(col + 1, row)?,
                self.map_pixel(col, row + 1)?,
                self.map_pixel(col + 1, row + 1)?,
            ],
        ))
    }

    /// Cell index along one axis and the fractional offset within it.
    ///
    /// Axes of length one have a single degenerate cell with zero offset.
    fn axis_cell(coord: F, len: usize) -> Option<(usize, F)> {
        if len < 2 {
            return Some((0, F::zero()));
        }
        let last = constant::<F, _>(len - 2);
        let base = coord.floor().max(F::zero()).min(last);
        Some((base.to_usize()?, coord - base))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::Affine2;
    use approx::assert_relative_eq;

    fn affine_pixmap(width: usize, height: usize) -> (Pixmap<f64>, Affine2<f64>) {
        let t = Affine2::new(1.8, 0.4, -0.3, 2.1, 100.0, 50.0);
        let pixmap = Pixmap::from_fn(width, height, |c, r| {
            t.apply_point(Point2::new(c as f64, r as f64))
        })
        .unwrap();
        (pixmap, t)
    }

    #[test]
    fn test_new_validates_shape() {
        let samples = vec![Point2::new(0.0_f64, 0.0); 6];
        assert!(Pixmap::new(3, 2, samples.clone()).is_ok());
        assert_eq!(
            Pixmap::new(4, 2, samples.clone()),
            Err(DrizzleError::ShapeMismatch {
                width: 4,
                height: 2,
                len: 6
            })
        );
        assert_eq!(Pixmap::new(0, 6, samples), Err(DrizzleError::EmptyPixmap));
    }

    #[test]
    fn test_get_is_row_major() {
        let (pixmap, t) = affine_pixmap(5, 3);
        assert_eq!(pixmap.get(2, 4), Some(t.apply_point(Point2::new(4.0, 2.0))));
        assert_eq!(pixmap.get(3, 0), None);
        assert_eq!(pixmap.get(0, 5), None);
    }

    #[test]
    fn test_map_point_reproduces_samples() {
        let (pixmap, _) = affine_pixmap(6, 4);
        for row in 0..4 {
            for col in 0..6 {
                let p = pixmap
                    .map_point(Point2::new(col as f64, row as f64))
                    .unwrap();
                let s = pixmap.map_pixel(col, row).unwrap();
                assert_relative_eq!(p.x, s.x, epsilon = 1e-12);
                assert_relative_eq!(p.y, s.y, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_map_point_exact_for_affine_including_extrapolation() {
        let (pixmap, t) = affine_pixmap(6, 4);
        for &(x, y) in &[(2.3, 1.7), (0.0, 0.0), (5.0, 3.0), (-0.8, 1.2), (6.4, -0.5)] {
            let p = pixmap.map_point(Point2::new(x, y)).unwrap();
            let e = t.apply_point(Point2::new(x, y));
            assert_relative_eq!(p.x, e.x, epsilon = 1e-10);
            assert_relative_eq!(p.y, e.y, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_bad_samples() {
        let (mut pixmap, _) = affine_pixmap(4, 4);
        pixmap.samples[5] = Point2::new(f64::NAN, 0.0);
        assert!(pixmap.is_bad(1, 1));
        assert!(pixmap.is_bad(9, 1));
        assert_eq!(pixmap.map_pixel(1, 1), None);
        assert!(pixmap.cell(0, 0).is_none());
        assert!(pixmap.cell(2, 2).is_some());
        assert!(pixmap.map_point(Point2::new(1.5, 0.5)).is_none());
        assert!(pixmap.map_point(Point2::new(2.5, 2.5)).is_some());
    }

    #[test]
    fn test_cell_bounds() {
        let (pixmap, _) = affine_pixmap(3, 3);
        assert!(pixmap.cell(1, 1).is_some());
        assert!(pixmap.cell(2, 1).is_none());
        assert!(pixmap.cell(1, 2).is_none());
    }

    #[test]
    fn test_single_row_pixmap() {
        let pixmap = Pixmap::from_fn(3, 1, |c, _| Point2::new(2.0 * c as f64, 7.0)).unwrap();
        let p = pixmap.map_point(Point2::new(1.5, 4.0)).unwrap();
        assert_relative_eq!(p.x, 3.0);
        assert_relative_eq!(p.y, 7.0);
        assert!(pixmap.cell(0, 0).is_none());
    }
}
