// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use seqad_bench::two_state_collection;
use seqad_kernels::{
    FisherMode, KernelType, StructuredHmm, build_fisher_kernel, build_histogram_kernel,
    build_sequence_kernel,
};

fn benchmark_sequence_linear_n200_len600(c: &mut Criterion) {
    let (coll, _) =
        two_state_collection(200, 100, 1, 600, 7).expect("benchmark fixture should be valid");
    c.bench_function("sequence_linear_n200_len600", |b| {
        b.iter(|| {
            build_sequence_kernel(black_box(&coll), 2.0, KernelType::Linear)
                .expect("sequence kernel benchmark should succeed");
        })
    });
}

fn benchmark_sequence_rbf_n200_len600(c: &mut Criterion) {
    let (coll, _) =
        two_state_collection(200, 100, 1, 600, 7).expect("benchmark fixture should be valid");
    c.bench_function("sequence_rbf_n200_len600", |b| {
        b.iter(|| {
            build_sequence_kernel(black_box(&coll), 2.0, KernelType::Rbf { width: 1.0 })
                .expect("rbf kernel benchmark should succeed");
        })
    });
}

fn benchmark_histogram_n200_len600_bins8(c: &mut Criterion) {
    let (coll, _) =
        two_state_collection(200, 100, 2, 600, 11).expect("benchmark fixture should be valid");
    c.bench_function("histogram_n200_len600_bins8", |b| {
        b.iter(|| {
            build_histogram_kernel(black_box(&coll), 8, 1.0)
                .expect("histogram kernel benchmark should succeed");
        })
    });
}

fn benchmark_fisher_n200_len600_k2(c: &mut Criterion) {
    let (coll, labels) =
        two_state_collection(200, 100, 1, 600, 13).expect("benchmark fixture should be valid");
    c.bench_function("fisher_n200_len600_k2", |b| {
        b.iter(|| {
            build_fisher_kernel::<StructuredHmm>(
                black_box(&coll),
                black_box(&labels),
                2,
                1.0,
                FisherMode::Estimated,
            )
            .expect("fisher kernel benchmark should succeed");
        })
    });
}

criterion_group!(
    benches,
    benchmark_sequence_linear_n200_len600,
    benchmark_sequence_rbf_n200_len600,
    benchmark_histogram_n200_len600_bins8,
    benchmark_fisher_n200_len600_k2
);
criterion_main!(benches);
