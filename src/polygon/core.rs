//! Core polygon type and basic measurements.

use crate::bounds::Aabb2;
use crate::primitives::Point2;
use crate::tolerance::Orientation;
use num_traits::Float;

/// A polygon represented as a sequence of vertices.
///
/// The polygon is implicitly closed (the last vertex connects to the first)
/// and may be wound either way. Degenerate vertex counts are meaningful
/// results of clipping: no vertices is an empty overlap, one vertex a
/// single touching point and two vertices a shared segment.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Polygon<F> {
    /// The vertices of the polygon in rotational order.
    pub vertices: Vec<Point2<F>>,
}

impl<F: Float> Polygon<F> {
    /// Creates a new polygon from vertices.
    #[inline]
    pub fn new(vertices: Vec<Point2<F>>) -> Self {
        Self { vertices }
    }

    /// Creates an empty polygon.
    #[inline]
    pub fn empty() -> Self {
        Self {
            vertices: Vec::new(),
        }
    }

    /// Creates a polygon from `(x, y)` tuples.
    ///
    /// ```
    /// use drizzlemap::Polygon;
    ///
    /// let square = Polygon::from_coords(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
    /// assert_eq!(square.area(), 1.0);
    /// ```
    pub fn from_coords(coords: &[(F, F)]) -> Self {
        Self {
            vertices: coords.iter().map(|&c| Point2::from(c)).collect(),
        }
    }

    /// Returns the vertices as `(x, y)` tuples.
    pub fn to_coords(&self) -> Vec<(F, F)> {
        self.vertices.iter().map(|p| p.to_tuple()).collect()
    }

    /// Returns true if the polygon has no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the signed area of the polygon using the shoelace formula.
    ///
    /// Positive for CCW winding, negative for CW winding, zero for fewer
    /// than three vertices.
    pub fn signed_area(&self) -> F {
        polygon_signed_area(&self.vertices)
    }

    /// Returns the absolute area of the polygon.
    pub fn area(&self) -> F {
        self.signed_area().abs()
    }

    /// Winding direction derived from the signed area.
    ///
    /// Areas within `abs_eps` of zero are reported as collinear.
    pub fn orientation(&self, abs_eps: F) -> Orientation {
        let twice_area = self.signed_area() * (F::one() + F::one());
        if twice_area > abs_eps {
            Orientation::CounterClockwise
        } else if twice_area < -abs_eps {
            Orientation::Clockwise
        } else {
            Orientation::Collinear
        }
    }

    /// Returns the bounding box, or `None` for an empty polygon.
    pub fn bounding_box(&self) -> Option<Aabb2<F>> {
        Aabb2::from_points(self.vertices.iter().copied())
    }

    /// Tests if a point lies inside or on the boundary of a convex polygon.
    ///
    /// Works for either winding. `abs_eps` is the allowed distance outside
    /// an edge. Always false for fewer than three vertices.
    pub fn contains_convex(&self, point: Point2<F>, abs_eps: F) -> bool {
        convex_contains(&self.vertices, point, abs_eps)
    }

    /// Returns the polygon with its vertex list cyclically rotated left by `k`.
    pub fn rotated(&self, k: usize) -> Self {
        let mut vertices = self.vertices.clone();
        if !vertices.is_empty() {
            let k = k % vertices.len();
            vertices.rotate_left(k);
        }
        Self { vertices }
    }

    /// Returns a polygon with reversed winding order.
    pub fn reversed(&self) -> Self {
        let mut vertices = self.vertices.clone();
        vertices.reverse();
        Self { vertices }
    }

    /// Returns the vertices sorted lexicographically by `(x, y)`.
    ///
    /// Useful for order-insensitive comparison of clip results.
    pub fn sorted_vertices(&self) -> Vec<Point2<F>> {
        let mut sorted = self.vertices.clone();
        sorted.sort_by(|a, b| {
            a.x.partial_cmp(&b.x)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.y.partial_cmp(&b.y).unwrap_or(std::cmp::Ordering::Equal))
        });
        sorted
    }
}

impl<F: Float> From<Aabb2<F>> for Polygon<F> {
    /// Counter-clockwise rectangle from a bounding box.
    fn from(aabb: Aabb2<F>) -> Self {
        Self::new(aabb.corners().to_vec())
    }
}

/// Computes the signed area of a polygon using the shoelace formula.
///
/// Positive for CCW winding, negative for CW winding.
pub fn polygon_signed_area<F: Float>(vertices: &[Point2<F>]) -> F {
    if vertices.len() < 3 {
        return F::zero();
    }

    // Relative to the first vertex to avoid cancellation far from the origin.
    let origin = vertices[0];
    let mut area = F::zero();
    let n = vertices.len();

    for i in 1..n - 1 {
        let a = vertices[i] - origin;
        let b = vertices[i + 1] - origin;
        area = area + a.cross(b);
    }

    area / (F::one() + F::one())
}

/// Computes the absolute area of a polygon.
pub fn polygon_area<F: Float>(vertices: &[Point2<F>]) -> F {
    polygon_signed_area(vertices).abs()
}

/// Inside-or-on test for a convex ring of either winding.
pub(crate) fn convex_contains<F: Float>(vertices: &[Point2<F>], point: Point2<F>, abs_eps: F) -> bool {
    let n = vertices.len();
    if n < 3 {
        return false;
    }
    let sign = if polygon_signed_area(vertices) < F::zero() {
        -F::one()
    } else {
        F::one()
    };

    for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        let edge = b - a;
        let len = edge.magnitude();
        if len == F::zero() {
            continue;
        }
        if sign * edge.cross(point - a) / len < -abs_eps {
            return false;
        }
    }
    true
}
