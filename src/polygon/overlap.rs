//! Exact overlap areas between pixel footprints and output pixels.
//!
//! A footprint is the quadrilateral an input pixel covers on the output
//! grid. Output pixel `(i, j)` is the unit square centred on `(i, j)`. The
//! area is accumulated edge by edge as signed areas under each segment,
//! clipped to the unit square, which is much cheaper than a general polygon
//! intersection when the clip shape is always an axis-aligned unit square.

use crate::bounds::Aabb2;
use crate::primitives::{constant, Point2};
use num_traits::Float;
use std::ops::RangeInclusive;

/// Slope data for one footprint edge.
#[derive(Debug, Clone, Copy, PartialEq)]
struct EdgeSlope<F> {
    /// `+1` when the edge runs towards increasing x, `-1` otherwise.
    sgn_dx: F,
    slope: F,
    /// Zero for vertical or zero-length edges, which enclose no area.
    inv_slope: F,
}

impl<F: Float> EdgeSlope<F> {
    fn new(from: Point2<F>, to: Point2<F>) -> Self {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let sgn_dx = if dx >= F::zero() { F::one() } else { -F::one() };
        if dx == F::zero() {
            return Self {
                sgn_dx,
                slope: F::infinity(),
                inv_slope: F::zero(),
            };
        }
        Self {
            sgn_dx,
            slope: dy / dx,
            inv_slope: dx / dy,
        }
    }
}

/// The quadrilateral footprint of an input pixel on the output grid.
///
/// Corners are stored clockwise (in a y-up frame); counter-clockwise input
/// is reordered on construction.
///
/// # Example
///
/// ```
/// use drizzlemap::{PixelFootprint, Point2};
///
/// // Input pixel shifted by a quarter pixel in x.
/// let footprint = PixelFootprint::new([
///     Point2::new(-0.25_f64, -0.5),
///     Point2::new(0.75, -0.5),
///     Point2::new(0.75, 0.5),
///     Point2::new(-0.25, 0.5),
/// ]);
/// assert!((footprint.overlap(0, 0) - 0.75).abs() < 1e-12);
/// assert!((footprint.overlap(1, 0) - 0.25).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelFootprint<F> {
    corners: [Point2<F>; 4],
    edges: [EdgeSlope<F>; 4],
    area: F,
}

impl<F: Float> PixelFootprint<F> {
    /// Prepares a quadrilateral for repeated overlap queries.
    pub fn new(corners: [Point2<F>; 4]) -> Self {
        let mut corners = corners;
        let half = constant::<F, _>(0.5);
        let mut area = half
            * ((corners[1].x - corners[3].x) * (corners[0].y - corners[2].y)
                - (corners[0].x - corners[2].x) * (corners[1].y - corners[3].y));
        if area < F::zero() {
            area = -area;
            corners.swap(1, 3);
        }

        let edges = [
            EdgeSlope::new(corners[0], corners[1]),
            EdgeSlope::new(corners[1], corners[2]),
            EdgeSlope::new(corners[2], corners[3]),
            EdgeSlope::new(corners[3], corners[0]),
        ];

        Self {
            corners,
            edges,
            area,
        }
    }

    /// Corners in clockwise order.
    #[inline]
    pub fn corners(&self) -> [Point2<F>; 4] {
        self.corners
    }

    /// Area of the quadrilateral.
    #[inline]
    pub fn area(&self) -> F {
        self.area
    }

    /// Bounding box of the quadrilateral.
    pub fn bounding_box(&self) -> Aabb2<F> {
        let first = Aabb2::new(self.corners[0], self.corners[0]);
        self.corners[1..]
            .iter()
            .fold(first, |aabb, &c| aabb.expand_to_include(c))
    }

    /// Area shared by the quadrilateral and output pixel `(i, j)`.
    pub fn overlap(&self, i: i64, j: i64) -> F {
        let half = constant::<F, _>(0.5);
        let ox = constant::<F, _>(i) - half;
        let oy = constant::<F, _>(j) - half;

        let local = self.corners.map(|c| Point2::new(c.x - ox, c.y - oy));
        let mut sum = F::zero();
        for k in 0..4 {
            sum = sum + area_under_segment(local[k], local[(k + 1) & 3], &self.edges[k]);
        }
        sum
    }

    /// Output pixels that can overlap the footprint, clipped to a
    /// `width x height` image.
    ///
    /// Returns `(columns, rows)`, or `None` when the footprint misses the
    /// image entirely.
    pub fn pixel_range(
        &self,
        width: usize,
        height: usize,
    ) -> Option<(RangeInclusive<usize>, RangeInclusive<usize>)> {
        let bbox = self.bounding_box();
        let columns = index_range(bbox.min.x, bbox.max.x, width)?;
        let rows = index_range(bbox.min.y, bbox.max.y, height)?;
        Some((columns, rows))
    }
}

/// Rounded, clipped index range `[round(lo), round(hi)] ∩ [0, len - 1]`.
fn index_range<F: Float>(lo: F, hi: F, len: usize) -> Option<RangeInclusive<usize>> {
    if len == 0 || !lo.is_finite() || !hi.is_finite() {
        return None;
    }
    let last = constant::<F, _>(len - 1);
    let lo = lo.round().max(F::zero());
    let hi = hi.round().min(last);
    if lo > hi {
        return None;
    }
    Some(lo.to_usize()?..=hi.to_usize()?)
}

/// Signed area under the segment `a -> b` inside the unit square at the
/// origin. Positive when the segment runs towards increasing x.
fn area_under_segment<F: Float>(a: Point2<F>, b: Point2<F>, edge: &EdgeSlope<F>) -> F {
    let zero = F::zero();
    let one = F::one();
    let half = constant::<F, _>(0.5);

    if edge.inv_slope == zero {
        return zero;
    }

    let (mut xlo, mut xhi) = if edge.sgn_dx < zero { (b.x, a.x) } else { (a.x, b.x) };
    if xlo >= one || xhi <= zero {
        return zero;
    }
    xlo = xlo.max(zero);
    xhi = xhi.min(one);

    let c = a.y - edge.slope * a.x;
    let mut ylo = edge.slope * xlo + c;
    let mut yhi = edge.slope * xhi + c;

    if ylo <= zero && yhi <= zero {
        return zero;
    }
    if ylo >= one && yhi >= one {
        return edge.sgn_dx * (xhi - xlo);
    }

    // Drop the part of the segment below the square.
    if ylo < zero {
        ylo = zero;
        xlo = -c * edge.inv_slope;
    }
    if yhi < zero {
        yhi = zero;
        xhi = -c * edge.inv_slope;
    }

    if ylo <= one {
        if yhi <= one {
            return edge.sgn_dx * half * (xhi - xlo) * (yhi + ylo);
        }
        let xtop = (one - c) * edge.inv_slope;
        return edge.sgn_dx * (half * (xtop - xlo) * (one + ylo) + xhi - xtop);
    }

    let xtop = (one - c) * edge.inv_slope;
    edge.sgn_dx * (half * (xhi - xtop) * (one + yhi) + xtop - xlo)
}

/// Overlap between an axis-aligned rectangle and output pixel `(i, j)`.
pub fn rect_pixel_overlap<F: Float>(i: i64, j: i64, rect: Aabb2<F>) -> F {
    rect.intersection(Aabb2::pixel(i, j))
        .map_or(F::zero(), Aabb2::area)
}
