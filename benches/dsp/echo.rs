//! Benchmarks for the dual-tap echo.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use sonic_playground::{dsp::EchoNetwork, EngineConfig};

use crate::{test_signal, BLOCK_SIZES};

pub fn bench_echo(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/echo");
    let config = EngineConfig::default();
    let (tap1, tap2) = config.tap_lengths();

    for &size in BLOCK_SIZES {
        let input = test_signal(size);

        // Zero mix still records history
        let mut echo = EchoNetwork::new(&config.echo, tap1, tap2);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("dry", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                echo.process(black_box(&mut buffer), black_box(0.0));
            })
        });

        let mut echo = EchoNetwork::new(&config.echo, tap1, tap2);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("wet", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                echo.process(black_box(&mut buffer), black_box(0.6));
            })
        });
    }

    group.finish();
}
