use criterion::{black_box, criterion_group, criterion_main, Criterion};
use thermogrid::{
    enrich, AreaSeries, CoordinateIndex, LatLon, NeighborFilter, TemperatureGrid,
    WindowStatsEngine, DEFAULT_WINDOW_SIZE,
};

fn synthetic_grid(days: usize, areas: usize) -> TemperatureGrid {
    TemperatureGrid::from_series(
        (0..areas)
            .map(|area| AreaSeries {
                area: area.to_string(),
                temps: (0..days)
                    .map(|day| 10.0 + ((area + day) % 17) as f64 * 0.5)
                    .collect(),
            })
            .collect(),
    )
}

fn bench_thermogrid(c: &mut Criterion) {
    let engine = WindowStatsEngine::new(DEFAULT_WINDOW_SIZE);
    let grid = synthetic_grid(365, 200);
    c.bench_function("window_stats_365x200", |b| {
        b.iter(|| engine.compute(black_box(grid.clone())))
    });

    let stats = engine.compute(synthetic_grid(365, 200));
    let index = CoordinateIndex::from_entries((0..200).map(|area| {
        (
            area.to_string(),
            LatLon(
                40.0 + (area % 50) as f64 * 0.1,
                5.0 + (area / 50) as f64 * 0.1,
            ),
        )
    }));
    let enriched = enrich(stats.records, &index);

    c.bench_function("neighbor_filter_build", |b| {
        b.iter(|| NeighborFilter::new(black_box(&enriched)))
    });

    let filter = NeighborFilter::new(&enriched);
    c.bench_function("neighbor_query", |b| {
        b.iter(|| filter.query(black_box(300), black_box("50")).unwrap())
    });
}

criterion_group!(benches, bench_thermogrid);
criterion_main!(benches);
