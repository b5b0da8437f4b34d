//! # Sparse K-Means Benchmarks
//!
//! Measures one budgeted quantization step per bit-depth and the full
//! adaptive search. Cost is O(n · 2^b · n_iters) per step.
//!
//! Run: `cargo bench --bench kmeans_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fedsparse::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn unit_gradient(n: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..n).map(|_| rng.r#gen::<f64>()).collect()
}

/// Benchmark compress_b across bit-depths
fn bench_compress_b(c: &mut Criterion) {
    let mut group = c.benchmark_group("compress_b");
    let data = unit_gradient(16_384);
    let budget = budget_for(&data, 0.6);
    let config = KMeansConfig::default();

    for bit_depth in [1u32, 2, 4, 6].iter() {
        group.bench_with_input(BenchmarkId::new("bits", bit_depth), bit_depth, |b, &bits| {
            b.iter(|| black_box(compress_b(&data, bits, budget, &config, squared_distance).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark the adaptive search under tight and loose budgets
fn bench_sparse_kmeans(c: &mut Criterion) {
    let mut group = c.benchmark_group("sparse_kmeans");
    group.sample_size(20);
    let data = unit_gradient(16_384);
    let config = KMeansConfig::default();

    for fraction in [0.01f64, 0.1, 0.6].iter() {
        let budget = budget_for(&data, *fraction);
        group.bench_with_input(BenchmarkId::new("budget_fraction", fraction), &budget, |b, &budget| {
            b.iter(|| black_box(sparse_kmeans(&data, budget, &config).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compress_b, bench_sparse_kmeans);

criterion_main!(benches);
