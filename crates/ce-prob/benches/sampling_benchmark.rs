use ce_core::SampleChunk;
use ce_prob::{RandomStreams, SamplingFamily};
use criterion::{Criterion, criterion_group, criterion_main};
use nalgebra::DMatrix;
use std::hint::black_box;

fn bench_sampling_families(c: &mut Criterion) {
    let streams = RandomStreams::new(42);
    let gaussian =
        DMatrix::from_row_slice(2, 5, &[0.0, 1.0, 2.0, 3.0, 4.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
    let exponential = DMatrix::from_row_slice(1, 5, &[0.25, 0.4, 0.1, 0.3, 0.2]);

    c.bench_function("gaussian_chunk_10k_x5", |b| {
        b.iter(|| {
            let mut rng = streams.stream(1, 0);
            let mut chunk = SampleChunk::new(0..10_000, 10_000, 5);
            SamplingFamily::Gaussian.sample_chunk(&mut chunk, &mut rng, &gaussian);
            black_box(chunk.values()[(9_999, 4)])
        })
    });

    c.bench_function("exponential_chunk_10k_x5", |b| {
        b.iter(|| {
            let mut rng = streams.stream(1, 0);
            let mut chunk = SampleChunk::new(0..10_000, 10_000, 5);
            SamplingFamily::Exponential.sample_chunk(&mut chunk, &mut rng, &exponential);
            black_box(chunk.values()[(9_999, 4)])
        })
    });

    let state = [0.3, 0.5, 0.2, 0.4, 0.1];
    let reference = DMatrix::from_row_slice(1, 5, &[0.9, 1.1, 0.3, 0.4, 0.8]);
    c.bench_function("exponential_likelihood_ratio_10k", |b| {
        b.iter(|| {
            let mut acc = 0.0;
            for _ in 0..10_000 {
                acc += SamplingFamily::Exponential.likelihood_ratio(
                    black_box(&state),
                    &exponential,
                    &reference,
                );
            }
            black_box(acc)
        })
    });
}

criterion_group!(benches, bench_sampling_families);
criterion_main!(benches);
