//! Benchmarks for convex clipping and pixel overlap.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use drizzlemap::{
    intersect_convex_polygons, ConvexPolygonClipper, PixelFootprint, Point2, Polygon, Scanline,
    Scanner,
};

/// Generates rotated, scaled pixel footprints around `(50, 50)`.
fn generate_footprints(count: usize, seed: u64) -> Vec<[Point2<f64>; 4]> {
    let mut footprints = Vec::with_capacity(count);
    let mut state = seed;
    let mut next = || {
        // xorshift for deterministic random
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state as f64 / u64::MAX as f64
    };

    for _ in 0..count {
        let cx = 50.0 + next() * 4.0;
        let cy = 50.0 + next() * 4.0;
        let angle = next() * std::f64::consts::PI;
        let scale = 0.6 + next() * 1.2;
        let (s, c) = angle.sin_cos();
        let corner = |u: f64, v: f64| {
            Point2::new(
                cx + scale * (c * u - s * v),
                cy + scale * (s * u + c * v),
            )
        };
        footprints.push([
            corner(-0.5, -0.5),
            corner(0.5, -0.5),
            corner(0.5, 0.5),
            corner(-0.5, 0.5),
        ]);
    }

    footprints
}

fn unit_pixel(i: f64, j: f64) -> Polygon<f64> {
    Polygon::from_coords(&[
        (i - 0.5, j - 0.5),
        (i + 0.5, j - 0.5),
        (i + 0.5, j + 0.5),
        (i - 0.5, j + 0.5),
    ])
}

fn bench_intersect(c: &mut Criterion) {
    let mut group = c.benchmark_group("intersect_convex_polygons");

    for count in [100, 1000, 10000] {
        let footprints: Vec<_> = generate_footprints(count, 12345)
            .into_iter()
            .map(|q| Polygon::new(q.to_vec()))
            .collect();
        let pixel = unit_pixel(51.0, 51.0);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("free_fn", count), &footprints, |b, fps| {
            b.iter(|| {
                fps.iter()
                    .map(|q| intersect_convex_polygons(black_box(&pixel), black_box(q)).area())
                    .sum::<f64>()
            })
        });

        let clipper = ConvexPolygonClipper::default();
        group.bench_with_input(BenchmarkId::new("clipper", count), &footprints, |b, fps| {
            b.iter(|| {
                fps.iter()
                    .map(|q| clipper.intersect(black_box(&pixel), black_box(q)).area())
                    .sum::<f64>()
            })
        });
    }

    group.finish();
}

fn bench_footprint_overlap(c: &mut Criterion) {
    let mut group = c.benchmark_group("footprint_overlap");

    for count in [100, 1000, 10000] {
        let footprints = generate_footprints(count, 54321);
        group.throughput(Throughput::Elements(count as u64));

        // Exact trapezoid integration over every touched pixel
        group.bench_with_input(BenchmarkId::new("boxer", count), &footprints, |b, fps| {
            b.iter(|| {
                let mut total = 0.0;
                for corners in fps {
                    let footprint = PixelFootprint::new(*corners);
                    if let Some((cols, rows)) = footprint.pixel_range(128, 128) {
                        for j in rows {
                            for i in cols.clone() {
                                total += footprint.overlap(i as i64, j as i64);
                            }
                        }
                    }
                }
                black_box(total)
            })
        });

        // The same overlaps through polygon clipping
        group.bench_with_input(BenchmarkId::new("clip", count), &footprints, |b, fps| {
            b.iter(|| {
                let mut total = 0.0;
                for corners in fps {
                    let footprint = PixelFootprint::new(*corners);
                    let polygon = Polygon::new(corners.to_vec());
                    if let Some((cols, rows)) = footprint.pixel_range(128, 128) {
                        for j in rows {
                            for i in cols.clone() {
                                let pixel = unit_pixel(i as f64, j as f64);
                                total += intersect_convex_polygons(&polygon, &pixel).area();
                            }
                        }
                    }
                }
                black_box(total)
            })
        });
    }

    group.finish();
}

fn bench_scanner(c: &mut Criterion) {
    let mut group = c.benchmark_group("scanner");

    for size in [16.0, 64.0, 256.0] {
        let polygon = Polygon::from_coords(&[
            (10.0, 5.0),
            (10.0 + size, 10.0),
            (5.0 + size, 5.0 + size),
            (3.0, 0.5 * size),
        ]);
        group.bench_with_input(BenchmarkId::new("rows", size as u64), &polygon, |b, poly| {
            b.iter(|| {
                let scanner = Scanner::new(black_box(poly), Some((512, 512)));
                let mut covered = 0_i64;
                if let Some(rows) = scanner.row_range() {
                    for y in rows {
                        match scanner.limits(y) {
                            Scanline::Span { start, end } => covered += end - start + 1,
                            Scanline::Skip => {}
                            Scanline::Done => break,
                        }
                    }
                }
                covered
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_intersect,
    bench_footprint_overlap,
    bench_scanner
);
criterion_main!(benches);
