//! Geometric predicates with explicit tolerance.

use crate::primitives::Point2;
use num_traits::Float;

/// Result of an orientation test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Points are counter-clockwise (positive area).
    CounterClockwise,
    /// Points are clockwise (negative area).
    Clockwise,
    /// Points are collinear (within tolerance).
    Collinear,
}

impl Orientation {
    /// `+1` for counter-clockwise, `-1` for clockwise, `0` for collinear.
    #[inline]
    pub fn signum<F: Float>(self) -> F {
        match self {
            Orientation::CounterClockwise => F::one(),
            Orientation::Clockwise => -F::one(),
            Orientation::Collinear => F::zero(),
        }
    }
}

/// Position of a point relative to a directed half-plane boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Strictly inside, farther than the tolerance from the boundary.
    Inside,
    /// Within the tolerance of the boundary line.
    Boundary,
    /// Strictly outside, farther than the tolerance from the boundary.
    Outside,
}

/// Computes the orientation of three points with tolerance.
///
/// `eps` is compared against the absolute value of the cross product
/// `(b - a) x (c - a)`, i.e. twice the signed triangle area.
#[inline]
pub fn orient2d<F: Float>(a: Point2<F>, b: Point2<F>, c: Point2<F>, eps: F) -> Orientation {
    let cross = (b - a).cross(c - a);

    if cross > eps {
        Orientation::CounterClockwise
    } else if cross < -eps {
        Orientation::Clockwise
    } else {
        Orientation::Collinear
    }
}

/// Signed perpendicular distance from `p` to the line through `start` and `end`.
///
/// Positive on the left of the directed line. Returns zero for a zero-length
/// line so that callers never divide by zero.
#[inline]
pub fn signed_distance_to_line<F: Float>(p: Point2<F>, start: Point2<F>, end: Point2<F>) -> F {
    let edge = end - start;
    let len = edge.magnitude();
    if len == F::zero() {
        return F::zero();
    }
    edge.cross(p - start) / len
}

/// Classifies a signed distance against an absolute tolerance.
///
/// Positive distances are inside.
#[inline]
pub fn classify_distance<F: Float>(distance: F, abs_eps: F) -> Side {
    if distance > abs_eps {
        Side::Inside
    } else if distance < -abs_eps {
        Side::Outside
    } else {
        Side::Boundary
    }
}

/// Returns true if `b` lies on the segment `a`-`c` within `abs_eps`.
///
/// Used to detect redundant polygon vertices: `b` must be within `abs_eps`
/// of the line and project inside the segment.
pub fn is_between<F: Float>(a: Point2<F>, b: Point2<F>, c: Point2<F>, abs_eps: F) -> bool {
    let ac = c - a;
    let len_sq = ac.magnitude_squared();
    if len_sq <= abs_eps * abs_eps {
        return false;
    }
    let len = len_sq.sqrt();
    let ab = b - a;
    if (ac.cross(ab) / len).abs() > abs_eps {
        return false;
    }
    let along = ab.dot(ac) / len;
    along >= -abs_eps && along <= len + abs_eps
}
