//! # Sparsifier Benchmarks
//!
//! Measures top-k, rand-k and sparse-ternary over growing gradient sizes.
//! All three are O(n) partitions plus an O(n) copy.
//!
//! Run: `cargo bench --bench sparsify_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fedsparse::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn gradient(n: usize) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(n as u64);
    (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect()
}

/// Benchmark sparsifiers at 10% retention
fn bench_sparsifiers(c: &mut Criterion) {
    let mut group = c.benchmark_group("sparsify");

    for size in [1_024usize, 16_384, 262_144].iter() {
        let data = gradient(*size);
        let retain_count = size / 10;
        group.throughput(Throughput::Elements(*size as u64));

        group.bench_with_input(BenchmarkId::new("top_k", size), &data, |b, d| {
            b.iter(|| black_box(top_k(d, retain_count).unwrap()))
        });

        group.bench_with_input(BenchmarkId::new("rand_k", size), &data, |b, d| {
            let mut rng = StdRng::seed_from_u64(0);
            b.iter(|| black_box(rand_k(d, retain_count, &mut rng).unwrap()))
        });

        group.bench_with_input(BenchmarkId::new("sparse_ternary", size), &data, |b, d| {
            b.iter(|| black_box(sparse_ternary(d, retain_count).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark the size estimator
fn bench_size_of(c: &mut Criterion) {
    let mut group = c.benchmark_group("size_of");
    let data = top_k(&gradient(262_144), 26_214).unwrap();

    group.bench_function("sparse_262k", |b| b.iter(|| black_box(size_of(&data))));

    group.finish();
}

criterion_group!(benches, bench_sparsifiers, bench_size_of);

criterion_main!(benches);
