//! Benchmarks for the adaptive low-pass cascade.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use sonic_playground::{config::FilterConfig, dsp::AdaptiveLowPass};

use crate::{test_signal, BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");
    let config = FilterConfig::default();

    for &size in BLOCK_SIZES {
        let input = test_signal(size);

        // Fixed cutoff: coefficients designed once
        let mut filter = AdaptiveLowPass::new(&config, SAMPLE_RATE as f32);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("steady", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.process(black_box(&mut buffer), black_box(0.5));
            })
        });

        // Sweeping cutoff: redesign every block
        let mut filter = AdaptiveLowPass::new(&config, SAMPLE_RATE as f32);
        let mut buffer = input.clone();
        let mut cutoff = 0.0f32;
        group.bench_with_input(BenchmarkId::new("sweep", size), &size, |b, _| {
            b.iter(|| {
                cutoff = (cutoff + 0.01) % 0.9;
                buffer.copy_from_slice(&input);
                filter.process(black_box(&mut buffer), black_box(cutoff));
            })
        });

        // 8th order
        let mut filter = AdaptiveLowPass::new(&config, SAMPLE_RATE as f32);
        filter.set_sections(4);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("8th_order", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.process(black_box(&mut buffer), black_box(0.5));
            })
        });
    }

    group.finish();
}
