//! Benchmarks for the fractional playhead.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use sonic_playground::dsp::Transport;

use crate::{test_signal, BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_resample(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/resample");
    let source = test_signal(SAMPLE_RATE as usize);

    for &size in BLOCK_SIZES {
        let mut out = vec![[0.0f32; 2]; size];

        for (name, rate) in [("unity", 1.0f64), ("bend", 1.37), ("reverse", -0.8)] {
            let mut transport = Transport::new(source.len());
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    transport.render(black_box(&source), black_box(rate), &mut out);
                })
            });
        }
    }

    group.finish();
}
