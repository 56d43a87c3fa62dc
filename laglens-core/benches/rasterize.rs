use std::time::{Duration, SystemTime};

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use laglens_core::{LatencyHistory, LatencyStatus, MapRasterizer, Marker};

/// Benchmark a full land-grid computation at common terminal sizes
fn bench_land_grid_miss(c: &mut Criterion) {
    let mut group = c.benchmark_group("land_grid_miss");
    group.sample_size(20);

    for (columns, rows) in [(80u16, 24u16), (160, 48), (240, 70)].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{columns}x{rows}")),
            &(*columns, *rows),
            |b, &(columns, rows)| {
                b.iter_batched(
                    || MapRasterizer::bundled().unwrap(),
                    |map| map.land_grid(black_box(columns), black_box(rows)).unwrap(),
                    BatchSize::SmallInput,
                );
            },
        );
    }
    group.finish();
}

/// Benchmark rendering from a warm cache with markers (per-frame cost)
fn bench_render_cached(c: &mut Criterion) {
    let map = MapRasterizer::bundled().unwrap();
    let markers: Vec<Marker> = laglens_core::default_hosts()
        .iter()
        .map(|h| Marker::new(h.latitude, h.longitude, LatencyStatus::Good))
        .collect();
    map.render(160, 48, &markers).unwrap();

    c.bench_function("render_cached_160x48", |b| {
        b.iter(|| map.render(black_box(160), black_box(48), black_box(&markers)).unwrap());
    });
}

/// Benchmark statistics over a full hour of 5-second samples
fn bench_statistics(c: &mut Criterion) {
    let history = LatencyHistory::new();
    let start = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
    for i in 0..720u64 {
        let latency = if i % 50 == 0 { None } else { Some((i % 90) as f64) };
        history.record("bench", latency, start + Duration::from_secs(i * 5));
    }
    let now = start + Duration::from_secs(3600);

    c.bench_function("statistics_720", |b| {
        b.iter(|| history.statistics_at(black_box("bench"), Duration::from_secs(3600), now));
    });
    c.bench_function("sparkline_720", |b| {
        b.iter(|| history.sparkline_at(black_box("bench"), Duration::from_secs(1800), 50, now));
    });
}

criterion_group!(
    benches,
    bench_land_grid_miss,
    bench_render_cached,
    bench_statistics
);
criterion_main!(benches);
