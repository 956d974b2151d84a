//! Row-by-row rasterisation of a convex polygon over pixel centres.

use crate::polygon::core::Polygon;
use crate::primitives::{constant, Point2};
use crate::tolerance::Tolerance;
use num_traits::Float;
use std::ops::RangeInclusive;

/// Column limits of one scanline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scanline {
    /// Pixel columns `start..=end` have centres inside the polygon.
    Span {
        /// First column.
        start: i64,
        /// Last column, inclusive.
        end: i64,
    },
    /// The row misses the polygon or the image, or the polygon has zero
    /// width at this row.
    Skip,
    /// The row is above the top vertex; no later row can intersect.
    Done,
}

/// A non-horizontal polygon edge, stored with `lo.y < hi.y`.
#[derive(Debug, Clone, Copy)]
struct ScanEdge<F> {
    lo: Point2<F>,
    hi: Point2<F>,
}

impl<F: Float> ScanEdge<F> {
    fn x_at(&self, y: F) -> F {
        let t = (y - self.lo.y) / (self.hi.y - self.lo.y);
        let x = self.lo.x + (self.hi.x - self.lo.x) * t;
        x.max(self.lo.x.min(self.hi.x)).min(self.lo.x.max(self.hi.x))
    }
}

/// Scanline limits of a convex polygon, optionally clipped to an image.
///
/// Rows and columns are integer pixel indices; pixel `(x, y)` is included
/// when its centre `(x, y)` lies inside or on the polygon.
///
/// # Example
///
/// ```
/// use drizzlemap::{Polygon, Scanline, Scanner};
///
/// let quad = Polygon::from_coords(&[(0.5, 0.5), (3.5, 0.5), (3.5, 2.5), (0.5, 2.5)]);
/// let scanner = Scanner::new(&quad, Some((3, 10)));
///
/// assert_eq!(scanner.row_range(), Some(1..=2));
/// assert_eq!(scanner.limits(1), Scanline::Span { start: 1, end: 2 });
/// assert_eq!(scanner.limits(3), Scanline::Done);
/// ```
#[derive(Debug, Clone)]
pub struct Scanner<F> {
    edges: Vec<ScanEdge<F>>,
    /// Horizontal edges as `(y, x_min, x_max)`.
    flats: Vec<(F, F, F)>,
    ymin: F,
    ymax: F,
    abs_eps: F,
    image: Option<(usize, usize)>,
}

impl<F: Float> Scanner<F> {
    /// Prepares `polygon` for scanning. `image` is `(width, height)`; pass
    /// `None` to scan without clipping.
    pub fn new(polygon: &Polygon<F>, image: Option<(usize, usize)>) -> Self {
        let vertices = &polygon.vertices;
        let abs_eps = Tolerance::default().absolute_for(vertices.iter());
        let n = vertices.len();

        let mut edges = Vec::with_capacity(n);
        let mut flats = Vec::new();
        for i in 0..n {
            let a = vertices[i];
            let b = vertices[(i + 1) % n];
            if a.y < b.y {
                edges.push(ScanEdge { lo: a, hi: b });
            } else if b.y < a.y {
                edges.push(ScanEdge { lo: b, hi: a });
            } else {
                flats.push((a.y, a.x.min(b.x), a.x.max(b.x)));
            }
        }

        let (ymin, ymax) = vertices.iter().fold(
            (F::infinity(), F::neg_infinity()),
            |(lo, hi), v| (lo.min(v.y), hi.max(v.y)),
        );

        Self {
            edges,
            flats,
            ymin,
            ymax,
            abs_eps,
            image,
        }
    }

    /// Rows whose pixel centres can fall inside the polygon, clipped to
    /// the image. `None` when there are none.
    pub fn row_range(&self) -> Option<RangeInclusive<i64>> {
        if !self.ymin.is_finite() || !self.ymax.is_finite() {
            return None;
        }
        let mut first = (self.ymin - self.abs_eps).ceil().to_i64()?;
        let mut last = (self.ymax + self.abs_eps).floor().to_i64()?;
        if let Some((_, height)) = self.image {
            first = first.max(0);
            last = last.min(height as i64 - 1);
        }
        (first <= last).then_some(first..=last)
    }

    /// Column limits for row `y`.
    pub fn limits(&self, y: i64) -> Scanline {
        let yf = constant::<F, _>(y);
        if yf > self.ymax + self.abs_eps || !self.ymax.is_finite() {
            return Scanline::Done;
        }
        if yf < self.ymin - self.abs_eps {
            return Scanline::Skip;
        }
        if let Some((_, height)) = self.image {
            if y < 0 || y >= height as i64 {
                return Scanline::Skip;
            }
        }

        // Clamp to the vertical extent so rows within tolerance of the top
        // or bottom vertex still meet the edges ending there.
        let ys = yf.max(self.ymin).min(self.ymax);
        let mut x1 = F::infinity();
        let mut x2 = F::neg_infinity();
        for edge in &self.edges {
            if edge.lo.y <= ys && ys <= edge.hi.y {
                let x = edge.x_at(ys);
                x1 = x1.min(x);
                x2 = x2.max(x);
            }
        }
        for &(fy, fx1, fx2) in &self.flats {
            if (fy - ys).abs() <= self.abs_eps {
                x1 = x1.min(fx1);
                x2 = x2.max(fx2);
            }
        }

        if !x1.is_finite() || !x2.is_finite() || x2 - x1 <= self.abs_eps {
            return Scanline::Skip;
        }

        let Some(mut start) = (x1 - self.abs_eps).ceil().to_i64() else {
            return Scanline::Skip;
        };
        let Some(mut end) = (x2 + self.abs_eps).floor().to_i64() else {
            return Scanline::Skip;
        };
        if let Some((width, _)) = self.image {
            start = start.max(0);
            end = end.min(width as i64 - 1);
        }

        if start > end {
            Scanline::Skip
        } else {
            Scanline::Span { start, end }
        }
    }
}
