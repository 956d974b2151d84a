//! Removal of duplicate and redundant polygon vertices.
//!
//! Both passes work on closed rings: the last vertex is adjacent to the
//! first. In-place variants let the clipper clean its scratch buffer without
//! allocating.
//!
//! # Example
//!
//! ```
//! use drizzlemap::tolerance::{remove_collinear_vertices, remove_duplicate_vertices};
//! use drizzlemap::Point2;
//!
//! let ring = vec![
//!     Point2::new(0.0_f64, 0.0),
//!     Point2::new(0.5, 0.0), // on the bottom edge
//!     Point2::new(1.0, 0.0),
//!     Point2::new(1.0, 1.0),
//!     Point2::new(1.0, 1.0), // repeated
//!     Point2::new(0.0, 1.0),
//! ];
//!
//! let cleaned = remove_collinear_vertices(&remove_duplicate_vertices(&ring, 1e-9), 1e-9);
//! assert_eq!(cleaned.len(), 4);
//! ```

use super::predicates::is_between;
use crate::primitives::Point2;
use num_traits::Float;

/// Removes consecutive vertices closer than `abs_eps` (per coordinate),
/// including the closing pair formed by the last and first vertex.
pub fn remove_duplicate_vertices<F: Float>(points: &[Point2<F>], abs_eps: F) -> Vec<Point2<F>> {
    let mut result = points.to_vec();
    dedup_ring(&mut result, abs_eps);
    result
}

/// Removes vertices that lie on the segment between their two neighbours.
///
/// Rings with fewer than three vertices are returned unchanged. A ring whose
/// vertices are all collinear collapses to its two extreme points.
pub fn remove_collinear_vertices<F: Float>(points: &[Point2<F>], abs_eps: F) -> Vec<Point2<F>> {
    let mut result = points.to_vec();
    drop_collinear_ring(&mut result, abs_eps);
    result
}

/// In-place form of [`remove_duplicate_vertices`].
pub(crate) fn dedup_ring<F: Float>(points: &mut Vec<Point2<F>>, abs_eps: F) {
    points.dedup_by(|current, kept| current.within(*kept, abs_eps));
    while points.len() > 1 {
        let first = points[0];
        match points.last() {
            Some(last) if last.within(first, abs_eps) => {
                points.pop();
            }
            _ => break,
        }
    }
}

/// In-place form of [`remove_collinear_vertices`].
pub(crate) fn drop_collinear_ring<F: Float>(points: &mut Vec<Point2<F>>, abs_eps: F) {
    // Each pass removes at most one vertex per position; stop when a pass
    // removes nothing.
    loop {
        let n = points.len();
        if n < 3 {
            return;
        }
        let mut removed = false;
        let mut i = 0;
        while i < points.len() && points.len() >= 3 {
            let n = points.len();
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            if is_between(prev, points[i], next, abs_eps) {
                points.remove(i);
                removed = true;
            } else {
                i += 1;
            }
        }
        if !removed {
            return;
        }
    }
}
