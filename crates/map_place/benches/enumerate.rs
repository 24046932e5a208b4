mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use map_place::prelude::{
    enumerate_positions, Bounds, Classifier, Expr, Rule, RuleCompiler, SatSolver, TileSets,
};

fn enumerate_interior_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("enumerate/interior");

    for &size in &[16u32, 32, 64] {
        let bounds = Bounds::for_grid(size, size).unwrap();
        let hi = i64::from(size) - 1;
        group.throughput(common::elements_throughput(bounds.area()));

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            let mut solver = SatSolver::new();
            b.iter(|| {
                let found = enumerate_positions(&mut solver, bounds, bounds.area(), |x, y| {
                    Expr::and([
                        x.greater_than(0),
                        x.less_than(hi),
                        y.greater_than(0),
                        y.less_than(hi),
                    ])
                })
                .unwrap();
                black_box(found);
            });
        });
    }

    group.finish();
}

fn enumerate_rule_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("enumerate/rules");
    let classifier = Classifier::new(TileSets::tiny_town()).unwrap();

    for &size in &[16u32, 40] {
        let grid = common::bench_town(size);
        let classification = classifier.classify(&grid);
        group.throughput(common::elements_throughput(grid.len()));

        for rule in [
            Rule::EnclosedArea,
            Rule::adjacent_to_tree(),
            Rule::AdjacentToPath,
            Rule::AnywhereOpen,
        ] {
            group.bench_with_input(BenchmarkId::new(rule.to_string(), size), &size, |b, _| {
                let compiler = RuleCompiler::new(&classification);
                let mut solver = SatSolver::new();
                b.iter(|| {
                    let found = compiler.candidates(&rule, &mut solver, None).unwrap();
                    black_box(found);
                });
            });
        }
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = enumerate_interior_benches,
              enumerate_rule_benches
}
criterion_main!(benches);
