mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use glam::IVec2;
use map_place::prelude::{
    allocate, filter_by_direction, Direction, GenerationPlan, ItemCatalog, OutputLayer, Placer,
    TileSets,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn square(side: i32) -> Vec<IVec2> {
    (0..side)
        .flat_map(|y| (0..side).map(move |x| IVec2::new(x, y)))
        .collect()
}

fn allocate_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocate/uniform");

    for &side in &[8i32, 32, 128] {
        let candidates = square(side);
        let count = candidates.len() / 2;
        group.throughput(common::elements_throughput(candidates.len()));

        group.bench_with_input(BenchmarkId::from_parameter(side), &side, |b, _| {
            let mut rng = StdRng::seed_from_u64(0xC0FFEE);
            b.iter_batched(
                || OutputLayer::new(side as u32, side as u32),
                |mut output| {
                    let allocation =
                        allocate(&candidates, count, 1, None, &mut output, &mut rng).unwrap();
                    black_box(allocation);
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn direction_filter_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocate/direction_filter");

    for &side in &[32i32, 256] {
        let candidates = square(side);
        group.throughput(common::elements_throughput(candidates.len()));

        for direction in [Direction::Left, Direction::Down] {
            group.bench_with_input(
                BenchmarkId::new(direction.to_string(), side),
                &side,
                |b, _| {
                    b.iter(|| black_box(filter_by_direction(&candidates, direction)));
                },
            );
        }
    }

    group.finish();
}

fn regenerate_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocate/regenerate");
    let catalog = ItemCatalog::tiny_town();
    let plan = GenerationPlan::tiny_town(&catalog).unwrap();

    for &size in &[16u32, 40] {
        let grid = common::bench_town(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            let mut placer = Placer::new(&grid, TileSets::tiny_town(), catalog.clone()).unwrap();
            let mut rng = StdRng::seed_from_u64(0xDEADBEEF);
            b.iter(|| black_box(placer.regenerate(&plan, &mut rng)));
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = allocate_benches,
              direction_filter_benches,
              regenerate_benches
}
criterion_main!(benches);
