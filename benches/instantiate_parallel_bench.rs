//! Compare one-thread vs pooled instantiation of a batch of units.
//!
//! Run with: `cargo bench --bench instantiate_parallel`

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use loadout::classdef::resolve_text;
use loadout::parallel::{instantiate_units, WorkerPool};
use loadout::settings::{LoadoutSettings, ParseSettings};

const UNIVERSE: &str = include_str!("../tests/data/example_loadout.hpp");

fn bench_instantiate_single_vs_pool(c: &mut Criterion) {
    let universe =
        resolve_text(UNIVERSE, &ParseSettings::default()).expect("example universe should resolve");
    let ar = universe.get("ar").expect("example defines ar");
    let settings = LoadoutSettings::default();
    let units = 2_000;
    let seed = 42u64;

    let mut group = c.benchmark_group("instantiate");
    group.sample_size(20);

    let single = WorkerPool::with_workers(1);
    group.bench_function("single_worker", |b| {
        b.iter(|| black_box(instantiate_units(ar, units, seed, &settings, &single)))
    });

    let pooled = WorkerPool::default();
    group.bench_function("default_pool", |b| {
        b.iter(|| black_box(instantiate_units(ar, units, seed, &settings, &pooled)))
    });
    group.finish();
}

criterion_group!(benches, bench_instantiate_single_vs_pool);
criterion_main!(benches);
