//! Benchmarks for instance generation and model formulation
//!
//! Solving is left out: it is dominated by the external solver.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use prodmix::instance::{SeedSequence, generate_instance, rng_for_seed};
use prodmix::model::build_production_model;

/// Instance sizes (number of products)
const SIZES: &[usize] = &[10, 100, 1_000, 10_000];

const BASE_SEED: i64 = 42;

/// Benchmark drawing the coefficient vectors of an instance
fn bench_instance_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("instance_generation");

    for &size in SIZES {
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("generate", size), &size, |b, &size| {
            b.iter(|| {
                let mut rng = rng_for_seed(black_box(BASE_SEED));
                black_box(generate_instance(black_box(size), &mut rng))
            })
        });
    }

    group.finish();
}

/// Benchmark formulating an already generated instance
fn bench_model_formulation(c: &mut Criterion) {
    let mut group = c.benchmark_group("model_formulation");

    for &size in SIZES {
        let mut rng = rng_for_seed(BASE_SEED);
        let instance = generate_instance(size, &mut rng);

        // 2n variables and 3n + 1 constraints
        group.throughput(Throughput::Elements((5 * size + 1) as u64));

        group.bench_with_input(
            BenchmarkId::new("build", size),
            &instance,
            |b, instance| b.iter(|| black_box(build_production_model(black_box(instance), "bench"))),
        );
    }

    group.finish();
}

/// Benchmark a whole run up to the solver: five seeds, five instances, five models
fn bench_run_preparation(c: &mut Criterion) {
    let mut group = c.benchmark_group("run_preparation");

    for &size in &SIZES[..3] {
        group.bench_with_input(BenchmarkId::new("five_instances", size), &size, |b, &size| {
            b.iter(|| {
                for (k, seed) in SeedSequence::new(BASE_SEED, size as u64, 5) {
                    let mut rng = rng_for_seed(seed);
                    let instance = generate_instance(size, &mut rng);
                    black_box(build_production_model(&instance, &format!("n{}_k{}", size, k)));
                }
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_instance_generation,
    bench_model_formulation,
    bench_run_preparation
);
criterion_main!(benches);
