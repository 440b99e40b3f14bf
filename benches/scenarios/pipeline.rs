//! Benchmarks for `Engine::process_block` with realistic control settings.

use std::{hint::black_box, sync::Arc};

use criterion::{BenchmarkId, Criterion};
use sonic_playground::{ControlSnapshot, Engine, EngineConfig, SampleBuffer};

use crate::{test_signal, BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/pipeline");
    let Ok(store) = SampleBuffer::new(test_signal(SAMPLE_RATE as usize * 2), SAMPLE_RATE, "bench")
    else {
        return;
    };
    let store = Arc::new(store);

    let presets = [
        ("transparent", ControlSnapshot::transparent()),
        (
            "everything",
            ControlSnapshot {
                pitch: 1.3,
                cutoff: 0.4,
                echo_mix: 0.5,
                distortion: 0.3,
                pan: -0.4,
                ..ControlSnapshot::default()
            },
        ),
        (
            "reverse_echo",
            ControlSnapshot {
                reverse: true,
                speed: 0.7,
                echo_mix: 0.8,
                ..ControlSnapshot::default()
            },
        ),
    ];

    for &size in BLOCK_SIZES {
        let mut out = vec![[0.0f32; 2]; size];

        for (name, controls) in presets.iter() {
            let mut engine = Engine::new(store.clone(), EngineConfig::default());
            group.bench_with_input(BenchmarkId::new(*name, size), &size, |b, _| {
                b.iter(|| engine.process_block(black_box(controls), black_box(&mut out)))
            });
        }
    }

    group.finish();
}
