//! Batched nearest-sample search over `f64` pixmaps.

use crate::pixmap::Pixmap;
use crate::primitives::Point2;

use super::point::Point2x4;

/// Squared distances from every point to `target`, in batches of 4.
pub fn distances_squared_to_point(points: &[Point2<f64>], target: Point2<f64>) -> Vec<f64> {
    let mut result = Vec::with_capacity(points.len());

    let mut chunks = points.chunks_exact(4);
    for chunk in &mut chunks {
        let d = Point2x4::from_slice(chunk).distance_squared_to(target);
        result.extend_from_slice(&d.to_array());
    }
    for p in chunks.remainder() {
        result.push(p.distance_squared(target));
    }

    result
}

/// Index of the finite point nearest to `target`.
///
/// Non-finite points are skipped. Ties go to the lowest index.
pub fn nearest_point_index(points: &[Point2<f64>], target: Point2<f64>) -> Option<usize> {
    let distances = distances_squared_to_point(points, target);
    let mut best: Option<(usize, f64)> = None;
    for (index, (p, &d2)) in points.iter().zip(&distances).enumerate() {
        if !p.is_finite() {
            continue;
        }
        if best.map_or(true, |(_, b)| d2 < b) {
            best = Some((index, d2));
        }
    }
    best.map(|(index, _)| index)
}

/// Nearest valid pixmap sample to `target` as `(col, row, distance)`.
///
/// A standalone batched search for callers working with `f64` pixmaps.
/// [`PixmapInverter`](crate::PixmapInverter) is generic over the float type
/// and always uses its own scalar search; both return the same sample,
/// ties included.
pub fn nearest_sample(pixmap: &Pixmap<f64>, target: Point2<f64>) -> Option<(usize, usize, f64)> {
    let index = nearest_point_index(pixmap.samples(), target)?;
    let distance = pixmap.samples()[index].distance(target);
    Some((index % pixmap.width(), index / pixmap.width(), distance))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn scattered(n: usize) -> Vec<Point2<f64>> {
        (0..n)
            .map(|i| {
                let t = i as f64;
                Point2::new((t * 0.37).sin() * 10.0, (t * 0.91).cos() * 7.0 + t * 0.1)
            })
            .collect()
    }

    #[test]
    fn test_distances_match_scalar() {
        let points = scattered(11);
        let target = Point2::new(0.3, -1.2);
        let d = distances_squared_to_point(&points, target);
        assert_eq!(d.len(), 11);
        for (p, d2) in points.iter().zip(d) {
            assert_relative_eq!(d2, p.distance_squared(target), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_nearest_point_index_matches_scalar() {
        let points = scattered(37);
        for &target in &[Point2::new(0.0, 0.0), Point2::new(5.0, 3.0), Point2::new(-9.0, 8.0)] {
            let expected = points
                .iter()
                .enumerate()
                .min_by(|a, b| {
                    a.1.distance_squared(target)
                        .partial_cmp(&b.1.distance_squared(target))
                        .unwrap()
                })
                .map(|(i, _)| i);
            assert_eq!(nearest_point_index(&points, target), expected);
        }
    }

    #[test]
    fn test_nearest_point_index_skips_non_finite() {
        let points = vec![
            Point2::new(f64::NAN, 0.0),
            Point2::new(0.0, f64::INFINITY),
            Point2::new(4.0, 4.0),
            Point2::new(0.1, 0.0),
            Point2::new(3.0, 3.0),
        ];
        assert_eq!(nearest_point_index(&points, Point2::new(0.0, 0.0)), Some(3));
    }

    #[test]
    fn test_ties_go_to_first() {
        let points = vec![
            Point2::new(1.0, 0.0),
            Point2::new(-1.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(0.0, -1.0),
            Point2::new(1.0, 0.0),
        ];
        assert_eq!(nearest_point_index(&points, Point2::new(0.0, 0.0)), Some(0));
    }

    #[test]
    fn test_empty_and_all_bad() {
        assert_eq!(nearest_point_index(&[], Point2::new(0.0, 0.0)), None);
        let bad = vec![Point2::new(f64::NAN, f64::NAN); 6];
        assert_eq!(nearest_point_index(&bad, Point2::new(0.0, 0.0)), None);
    }

    #[test]
    fn test_nearest_sample_on_pixmap() {
        let pixmap =
            Pixmap::from_fn(9, 5, |c, r| Point2::new(2.0 * c as f64, 3.0 * r as f64)).unwrap();
        let (col, row, dist) = nearest_sample(&pixmap, Point2::new(8.6, 6.2)).unwrap();
        assert_eq!((col, row), (4, 2));
        assert_relative_eq!(dist, (0.36_f64 + 0.04).sqrt(), epsilon = 1e-12);
    }
}
