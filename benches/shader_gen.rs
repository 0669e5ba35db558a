//! Benchmarks for shader assembly and CPU-side setup work.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use curlfield::settings::SimSettings;
use curlfield::{copy, geometry, noise, renderer, simulation, spawn, transform};

fn bench_shader_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("shader_assembly");

    group.bench_function("integration", |b| {
        b.iter(|| black_box(simulation::integration_shader(black_box(7))))
    });

    group.bench_function("field_library", |b| {
        b.iter(|| black_box(noise::field_wgsl(black_box(7))))
    });

    group.bench_function("transform", |b| {
        b.iter(|| black_box(transform::transform_shader()))
    });

    group.bench_function("copy", |b| b.iter(|| black_box(copy::copy_shader())));

    group.bench_function("point", |b| b.iter(|| black_box(renderer::point_shader())));

    group.finish();
}

fn bench_spawn(c: &mut Criterion) {
    let mut group = c.benchmark_group("spawn");

    for resolution in [64u32, 128, 256, 512] {
        group.bench_with_input(
            BenchmarkId::new("uniform_cloud", resolution),
            &resolution,
            |b, &resolution| {
                let settings = SimSettings::new().with_resolution(resolution);
                b.iter(|| black_box(spawn::uniform_cloud(&settings)))
            },
        );
    }

    group.finish();
}

fn bench_lookup_geometry(c: &mut Criterion) {
    let mut group = c.benchmark_group("geometry");

    for resolution in [128u32, 512] {
        group.bench_with_input(
            BenchmarkId::new("lookup_grid", resolution),
            &resolution,
            |b, &resolution| b.iter(|| black_box(geometry::lookup_grid(resolution))),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_shader_assembly,
    bench_spawn,
    bench_lookup_geometry,
);
criterion_main!(benches);
