//! Benchmarks for distance and donation geometry.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use myocean_geo::{
    batch::PointItem, diamond_polygon, haversine_distance, rect_bounds, within_radius, Coordinate,
};

fn create_test_items(count: usize) -> Vec<PointItem> {
    (0..count)
        .map(|i| {
            // Points spread over the sea off Busan
            let lat = 34.8 + (i as f64 * 0.001) % 0.6;
            let lng = 128.9 + (i as f64 * 0.0013) % 0.6;
            PointItem {
                id: format!("donation-{i}"),
                location: Coordinate::new(lat, lng),
            }
        })
        .collect()
}

fn bench_single_distance(c: &mut Criterion) {
    let busan = Coordinate::new(35.1, 129.0);
    let ulsan = Coordinate::new(35.5384, 129.3114);

    c.bench_function("haversine_single", |b| {
        b.iter(|| haversine_distance(black_box(&busan), black_box(&ulsan)))
    });
}

fn bench_shapes(c: &mut Criterion) {
    let center = Coordinate::new(35.1, 129.0);
    let mut group = c.benchmark_group("donation_shapes");

    group.bench_function("diamond", |b| {
        b.iter(|| diamond_polygon(black_box(&center), black_box(10.0)))
    });

    group.bench_function("rect", |b| {
        b.iter(|| rect_bounds(black_box(&center), black_box(10.0)))
    });

    group.finish();
}

fn bench_radius_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("within_radius");
    let hotspot = Coordinate::new(35.1, 129.1);

    for size in [10, 100, 1000, 10000].iter() {
        let items = create_test_items(*size);

        group.bench_with_input(BenchmarkId::new("donations", size), size, |b, _| {
            b.iter(|| within_radius(black_box(&hotspot), black_box(&items), black_box(10.0)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_single_distance, bench_shapes, bench_radius_filter);
criterion_main!(benches);
