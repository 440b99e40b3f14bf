//! Benchmarks for the tanh waveshaper.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use sonic_playground::{config::DistortionConfig, dsp::distortion::distort};

use crate::{test_signal, BLOCK_SIZES};

pub fn bench_distortion(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/distortion");
    let config = DistortionConfig::default();

    for &size in BLOCK_SIZES {
        let input = test_signal(size);
        let mut buffer = input.clone();

        for (name, amount) in [("warm", 0.1f32), ("heavy", 0.9)] {
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    distort(black_box(&mut buffer), black_box(amount), &config);
                })
            });
        }
    }

    group.finish();
}
