//! Four-wide point batches.

use wide::f64x4;

use crate::primitives::Point2;

/// A batch of 4 2D points.
#[derive(Clone, Copy, Debug)]
pub struct Point2x4 {
    pub x: f64x4,
    pub y: f64x4,
}

impl Point2x4 {
    #[inline]
    pub fn new(x: f64x4, y: f64x4) -> Self {
        Self { x, y }
    }

    /// Creates a batch from the first 4 points of a slice.
    ///
    /// # Panics
    ///
    /// Panics if the slice has fewer than 4 points.
    #[inline]
    pub fn from_slice(points: &[Point2<f64>]) -> Self {
        Self {
            x: f64x4::new([points[0].x, points[1].x, points[2].x, points[3].x]),
            y: f64x4::new([points[0].y, points[1].y, points[2].y, points[3].y]),
        }
    }

    /// Creates a batch where all 4 points are the same.
    #[inline]
    pub fn splat(p: Point2<f64>) -> Self {
        Self {
            x: f64x4::splat(p.x),
            y: f64x4::splat(p.y),
        }
    }

    /// Squared distance from each lane to `target`.
    #[inline]
    pub fn distance_squared_to(self, target: Point2<f64>) -> f64x4 {
        let dx = self.x - f64x4::splat(target.x);
        let dy = self.y - f64x4::splat(target.y);
        dx * dx + dy * dy
    }

    #[inline]
    pub fn to_array(self) -> [Point2<f64>; 4] {
        let x = self.x.to_array();
        let y = self.y.to_array();
        [
            Point2::new(x[0], y[0]),
            Point2::new(x[1], y[1]),
            Point2::new(x[2], y[2]),
            Point2::new(x[3], y[3]),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice_round_trips() {
        let points: Vec<_> = (0..4).map(|i| Point2::new(i as f64, -(i as f64))).collect();
        assert_eq!(Point2x4::from_slice(&points).to_array().to_vec(), points);
    }

    #[test]
    fn test_distance_squared_to() {
        let batch = Point2x4::from_slice(&[
            Point2::new(3.0, 4.0),
            Point2::new(0.0, 0.0),
            Point2::new(-1.0, 0.0),
            Point2::new(1.0, 1.0),
        ]);
        let d = batch.distance_squared_to(Point2::new(0.0, 0.0)).to_array();
        assert_eq!(d, [25.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_splat() {
        let p = Point2::new(1.5, 2.5);
        assert_eq!(Point2x4::splat(p).to_array(), [p; 4]);
    }
}
