//! Benchmark for the plot build pipeline and command rendering.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trueno_gg::prelude::*;

fn labeled(size: usize) -> Table {
    let x: Vec<f32> = (0..size).map(|i| i as f32).collect();
    let y: Vec<f32> = (0..size).map(|i| (i as f32).sin()).collect();
    Table::from_xy(&x, &y)
        .with_column("g", Column::discrete((0..size).map(|i| format!("g{}", i % 4))))
        .unwrap()
}

fn point_build_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_points");

    for size in [100, 1_000, 10_000] {
        let plot = GGPlot::new()
            .data(labeled(size))
            .aes(Aes::new().x("x").y("y").color("g"))
            .geom(Geom::point());
        let warnings = WarningLog::new();

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(&plot).build_with_warnings(&warnings).unwrap());
        });
    }

    group.finish();
}

fn histogram_build_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_histogram");

    for size in [1_000, 10_000, 100_000] {
        let plot = GGPlot::new()
            .data(labeled(size))
            .aes(Aes::new().x("y"))
            .geom(Geom::histogram(30))
            .facet(Facet::wrap("g", 2));
        let warnings = WarningLog::new();

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| black_box(&plot).build_with_warnings(&warnings).unwrap());
        });
    }

    group.finish();
}

fn render_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_lines");

    for size in [1_000, 10_000] {
        let warnings = WarningLog::new();
        let built = GGPlot::new()
            .data(labeled(size))
            .aes(Aes::new().x("x").y("y").color("g"))
            .geom(Geom::line())
            .build_with_warnings(&warnings)
            .unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let mut recorder = CommandRecorder::new();
                built.render_with_warnings(&mut recorder, &warnings).unwrap();
                recorder
            });
        });
    }

    group.finish();
}

criterion_group!(benches, point_build_benchmark, histogram_build_benchmark, render_benchmark);
criterion_main!(benches);
