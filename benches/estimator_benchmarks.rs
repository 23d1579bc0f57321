//! Estimator benchmarks.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use expvar::prelude::*;

fn bench_stratified(c: &mut Criterion) {
    let mut group = c.benchmark_group("stratified");
    group.sample_size(50);

    for n in [1_000usize, 10_000, 100_000] {
        let sequential = StratifiedEstimator::new(n, 1.0, &DEFAULT_BOUNDARIES).unwrap();
        let parallel = sequential.clone().with_parallel(true);

        group.bench_with_input(BenchmarkId::new("sequential", n), &n, |b, _| {
            let mut rng = SimRng::new(42);
            b.iter(|| black_box(sequential.run(&mut rng).unwrap().estimate.result.estimate));
        });
        group.bench_with_input(BenchmarkId::new("parallel", n), &n, |b, _| {
            let mut rng = SimRng::new(42);
            b.iter(|| black_box(parallel.run(&mut rng).unwrap().estimate.result.estimate));
        });
    }

    group.finish();
}

fn bench_siblings(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimators");
    let n = 10_000;

    let antithetic = AntitheticEstimator::new(1.0, &[n]).unwrap();
    group.bench_function("antithetic", |b| {
        let mut rng = SimRng::new(42);
        b.iter(|| black_box(antithetic.estimate(n, &mut rng).unwrap()));
    });

    for mode in [ControlMode::GlobalShift, ControlMode::Optimal] {
        let control = ControlVariateEstimator::new(n, 1.0, 2.0, mode).unwrap();
        group.bench_function(BenchmarkId::new("control", format!("{mode:?}")), |b| {
            let mut rng = SimRng::new(42);
            b.iter(|| black_box(control.run(&mut rng).unwrap().result.estimate));
        });
    }

    let conditional = ConditionalEstimator::new(n, 1.0, DEFAULT_THRESHOLD).unwrap();
    group.bench_function("conditional", |b| {
        let mut rng = SimRng::new(42);
        b.iter(|| black_box(conditional.run(&mut rng).result.estimate));
    });

    group.finish();
}

criterion_group!(benches, bench_stratified, bench_siblings);
criterion_main!(benches);
