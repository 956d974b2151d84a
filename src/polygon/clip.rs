//! Intersection of two convex polygons.
//!
//! The overlap is computed by Sutherland-Hodgman half-plane clipping with a
//! three-way side test, so vertices lying on a clip line are kept exactly as
//! given rather than being replaced by recomputed crossings. Shared corners,
//! shared edges and containment therefore produce exact input coordinates.

use crate::polygon::core::{convex_contains, Polygon};
use crate::primitives::Point2;
use crate::tolerance::{
    classify_distance, dedup_ring, drop_collinear_ring, signed_distance_to_line, Orientation,
    Side, Tolerance,
};
use num_traits::Float;

/// Computes the intersection of two convex polygons.
///
/// Both polygons may be wound either way. The result may be empty (no
/// overlap), a single point (touching corners), a segment (shared edge only)
/// or a convex polygon.
///
/// # Example
///
/// ```
/// use drizzlemap::{intersect_convex_polygons, Polygon};
///
/// let pixel = Polygon::<f64>::from_coords(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
/// let footprint = Polygon::from_coords(&[(0.5, 0.5), (1.5, 0.5), (1.5, 1.5), (0.5, 1.5)]);
///
/// let overlap = intersect_convex_polygons(&pixel, &footprint);
/// assert_eq!(overlap.len(), 4);
/// assert!((overlap.area() - 0.25).abs() < 1e-12);
/// ```
pub fn intersect_convex_polygons<F: Float>(p: &Polygon<F>, q: &Polygon<F>) -> Polygon<F> {
    ConvexPolygonClipper::default().intersect(p, q)
}

/// Like [`intersect_convex_polygons`] with an explicit tolerance.
pub fn intersect_convex_polygons_with_tolerance<F: Float>(
    p: &Polygon<F>,
    q: &Polygon<F>,
    tolerance: Tolerance<F>,
) -> Polygon<F> {
    ConvexPolygonClipper::new(tolerance).intersect(p, q)
}

/// Convex polygon intersection with a fixed tolerance.
///
/// A clipper holds no per-call state and can be shared between threads.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConvexPolygonClipper<F> {
    /// Tolerance for side tests and vertex coincidence.
    pub tolerance: Tolerance<F>,
}

impl<F: Float> Default for ConvexPolygonClipper<F> {
    fn default() -> Self {
        Self::new(Tolerance::default())
    }
}

impl<F: Float> ConvexPolygonClipper<F> {
    /// Creates a clipper using the given tolerance.
    #[inline]
    pub fn new(tolerance: Tolerance<F>) -> Self {
        Self { tolerance }
    }

    /// Returns the intersection of `p` and `q`.
    ///
    /// When one polygon lies inside or on the other, the contained polygon is
    /// returned with its own vertex order. Otherwise `p` is clipped against
    /// every edge of `q` and keeps the winding of `p`. In all cases repeated
    /// vertices and vertices lying between their neighbours are removed.
    pub fn intersect(&self, p: &Polygon<F>, q: &Polygon<F>) -> Polygon<F> {
        if p.is_empty() || q.is_empty() {
            return Polygon::empty();
        }

        let abs_eps = self
            .tolerance
            .absolute_for(p.vertices.iter().chain(q.vertices.iter()));

        let mut subject = p.vertices.clone();
        let mut clip = q.vertices.clone();
        dedup_ring(&mut subject, abs_eps);
        dedup_ring(&mut clip, abs_eps);

        if contained_in(&subject, &clip, abs_eps) {
            return finish(subject, abs_eps);
        }
        if contained_in(&clip, &subject, abs_eps) {
            return finish(clip, abs_eps);
        }

        let area_eps = abs_eps * abs_eps;
        let mut orientation = Polygon::new(clip.clone()).orientation(area_eps);
        if orientation == Orientation::Collinear {
            // A flat clip polygon has no inside; clip the other way round.
            let flipped = Polygon::new(subject.clone()).orientation(area_eps);
            if flipped == Orientation::Collinear {
                log::debug!(
                    "both polygons are degenerate ({} and {} vertices), no overlap computed",
                    subject.len(),
                    clip.len()
                );
                return Polygon::empty();
            }
            std::mem::swap(&mut subject, &mut clip);
            orientation = flipped;
        }

        let clipped = clip_against_convex(subject, &clip, orientation.signum(), abs_eps);
        finish(clipped, abs_eps)
    }
}

/// True when every vertex of `inner` is inside or on the convex ring `outer`.
fn contained_in<F: Float>(inner: &[Point2<F>], outer: &[Point2<F>], abs_eps: F) -> bool {
    outer.len() >= 3 && inner.iter().all(|&v| convex_contains(outer, v, abs_eps))
}

fn finish<F: Float>(mut vertices: Vec<Point2<F>>, abs_eps: F) -> Polygon<F> {
    dedup_ring(&mut vertices, abs_eps);
    drop_collinear_ring(&mut vertices, abs_eps);
    Polygon::new(vertices)
}

/// Clips `subject` successively against every edge of `clip`.
///
/// `sign` is `+1` for a counter-clockwise clip ring and `-1` for clockwise,
/// so that positive scaled distances are always inside.
fn clip_against_convex<F: Float>(
    subject: Vec<Point2<F>>,
    clip: &[Point2<F>],
    sign: F,
    abs_eps: F,
) -> Vec<Point2<F>> {
    let mut current = subject;
    let mut next = Vec::with_capacity(current.len() + clip.len());
    let n = clip.len();

    for i in 0..n {
        let edge_start = clip[i];
        let edge_end = clip[(i + 1) % n];
        if (edge_end - edge_start).magnitude() <= abs_eps {
            continue;
        }

        clip_half_plane(&current, &mut next, edge_start, edge_end, sign, abs_eps);
        std::mem::swap(&mut current, &mut next);
        if current.is_empty() {
            break;
        }
    }

    current
}

/// One Sutherland-Hodgman pass against the half-plane left of `start -> end`
/// (right when `sign` is negative).
fn clip_half_plane<F: Float>(
    input: &[Point2<F>],
    output: &mut Vec<Point2<F>>,
    start: Point2<F>,
    end: Point2<F>,
    sign: F,
    abs_eps: F,
) {
    output.clear();
    let Some(&last) = input.last() else {
        return;
    };

    let mut prev = last;
    let mut prev_d = sign * signed_distance_to_line(prev, start, end);
    let mut prev_side = classify_distance(prev_d, abs_eps);

    for &cur in input {
        let d = sign * signed_distance_to_line(cur, start, end);
        let side = classify_distance(d, abs_eps);

        match side {
            Side::Inside => {
                if prev_side == Side::Outside {
                    output.push(crossing(prev, prev_d, cur, d));
                }
                output.push(cur);
            }
            Side::Boundary => output.push(cur),
            Side::Outside => {
                if prev_side == Side::Inside {
                    output.push(crossing(prev, prev_d, cur, d));
                }
            }
        }

        prev = cur;
        prev_d = d;
        prev_side = side;
    }
}

/// Point where the segment `a -> b` crosses the clip line.
///
/// Only called for endpoints on strictly opposite sides, so `da - db` is at
/// least twice the tolerance in magnitude.
#[inline]
fn crossing<F: Float>(a: Point2<F>, da: F, b: Point2<F>, db: F) -> Point2<F> {
    a.lerp(b, da / (da - db))
}
