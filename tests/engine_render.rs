//! Whole-chain properties, rendered without an output device.

use std::{collections::VecDeque, sync::Arc};

use sonic_playground::{
    dsp::pan::pan_gains,
    engine::EngineCommand,
    ControlSnapshot, Engine, EngineConfig, Frame, ParamSurface, SampleBuffer, Seek,
};

const SR: u32 = 44_100;

fn noise_store(len: usize, seed: u32) -> Arc<SampleBuffer> {
    let mut state = seed;
    let mut next = move || {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        (state >> 8) as f32 / (1 << 24) as f32 * 2.0 - 1.0
    };
    let frames = (0..len).map(|_| [next(), next()]).collect();
    Arc::new(SampleBuffer::new(frames, SR, "noise").unwrap())
}

fn impulse_store(len: usize) -> Arc<SampleBuffer> {
    let mut frames = vec![[0.0; 2]; len];
    frames[0] = [1.0, 1.0];
    Arc::new(SampleBuffer::new(frames, SR, "impulse").unwrap())
}

fn render_blocks(engine: &mut Engine, controls: &ControlSnapshot, blocks: usize, len: usize) -> Vec<Frame> {
    let mut out = Vec::with_capacity(blocks * len);
    let mut block = vec![[0.0; 2]; len];
    for _ in 0..blocks {
        engine.process_block(controls, &mut block);
        out.extend_from_slice(&block);
    }
    out
}

#[test]
fn test_output_is_bounded_for_any_controls() {
    let store = noise_store(20_000, 7);
    let mut engine = Engine::new(store, EngineConfig::default());
    let mut block = vec![[0.0; 2]; 512];

    let volumes = [0.0, 0.7, 1.5, 40.0, f32::INFINITY];
    let cutoffs = [0.0, 0.3, 0.96, 1.0];
    let drives = [0.0, 0.5, 1.0];
    let mixes = [0.0, 0.5, 1.0];
    let pans = [-1.0, 0.3, 1.0];

    for &volume in &volumes {
        for &cutoff in &cutoffs {
            for &distortion in &drives {
                for &echo_mix in &mixes {
                    for &pan in &pans {
                        let controls = ControlSnapshot {
                            volume,
                            pitch: 3.3,
                            speed: 0.8,
                            cutoff,
                            echo_mix,
                            distortion,
                            pan,
                            reverse: pan > 0.0,
                            playing: true,
                        }
                        .clamped();
                        engine.process_block(&controls, &mut block);
                        for frame in &block {
                            assert!(
                                (-1.0..=1.0).contains(&frame[0]) && (-1.0..=1.0).contains(&frame[1]),
                                "out of range {:?} with {:?}",
                                frame,
                                controls
                            );
                        }
                    }
                }
            }
        }
    }
}

#[test]
fn test_identity_controls_reproduce_source() {
    let store = noise_store(5_000, 3);
    let mut engine = Engine::new(store.clone(), EngineConfig::default());
    engine.seek(Seek::Frames(1_000.0));

    let out = render_blocks(&mut engine, &ControlSnapshot::transparent(), 3, 1024);

    // 3072 frames from 1000 wraps past the end of the 5000-frame source
    for (i, frame) in out.iter().enumerate() {
        assert_eq!(*frame, store.frames()[(1_000 + i) % 5_000], "frame {}", i);
    }
}

#[test]
fn test_echo_history_records_at_zero_mix() {
    let store = impulse_store(SR as usize);
    let mut engine = Engine::new(store, EngineConfig::default());
    let (tap1, _) = engine.echo().taps();

    // Impulse passes through dry; nothing audible comes back
    let mut dry = ControlSnapshot::transparent();
    let silent = render_blocks(&mut engine, &dry, 10, 1024);
    assert_eq!(silent[0], [1.0, 1.0]);
    assert!(silent[1..].iter().all(|f| *f == [0.0, 0.0]));

    // Raise the mix before tap1 reaches the impulse: the echo is there
    dry.echo_mix = 1.0;
    let wet = render_blocks(&mut engine, &dry, 10, 1024);
    let at = tap1 - 10 * 1024;
    assert!(
        (wet[at][0] - 1.0).abs() < 1e-6,
        "expected unscaled history at {}, got {:?}",
        at,
        wet[at]
    );
}

#[test]
fn test_reverse_position_wraps_through_zero() {
    let len = 1_000;
    let mut engine = Engine::new(noise_store(len, 11), EngineConfig::default());
    engine.seek(Seek::Frames(500.0));

    let controls = ControlSnapshot {
        pitch: 1.5,
        reverse: true,
        ..ControlSnapshot::transparent()
    };
    let r = controls.rate().abs();
    let mut block = vec![[0.0; 2]; 256];
    let mut expected = 500.0f64;

    for _ in 0..10 {
        engine.process_block(&controls, &mut block);
        expected = (expected - 256.0 * r).rem_euclid(len as f64);
        assert!(
            (engine.position() - expected).abs() < 1e-6,
            "position {} expected {}",
            engine.position(),
            expected
        );
        assert!((0.0..len as f64).contains(&engine.position()));
    }
}

#[test]
fn test_filter_memory_tracks_order_across_bypass() {
    let mut engine = Engine::new(noise_store(8_000, 5), EngineConfig::default());
    let mut block = vec![[0.0; 2]; 300];
    let mut controls = ControlSnapshot::transparent();

    for i in 0..40 {
        controls.cutoff = if i % 2 == 0 { 0.4 } else { 0.99 };
        engine.process_block(&controls, &mut block);

        let filter = engine.filter();
        assert_eq!(filter.memory_len(0), filter.sections());
        assert_eq!(filter.memory_len(1), filter.sections());
        assert_eq!(filter.is_engaged(), i % 2 == 0);
    }
}

#[test]
fn test_pan_hard_right() {
    assert_eq!(pan_gains(1.0), (0.0, 1.0));

    let frames = vec![[0.8, 0.8]; 2_048];
    let store = Arc::new(SampleBuffer::new(frames, SR, "dc").unwrap());
    let mut engine = Engine::new(store, EngineConfig::default());
    let controls = ControlSnapshot {
        pan: 1.0,
        ..ControlSnapshot::transparent()
    };

    let out = render_blocks(&mut engine, &controls, 1, 512);
    assert!(out.iter().all(|f| f[0] == 0.0 && f[1] == 0.8));
}

#[test]
fn test_silent_source_renders_silence() {
    let store = Arc::new(SampleBuffer::silence(1.0, SR));
    let mut engine = Engine::new(store, EngineConfig::default());
    let controls = ControlSnapshot {
        volume: 0.5,
        ..ControlSnapshot::default()
    };

    let out = render_blocks(&mut engine, &controls, 1, 1024);
    assert_eq!(out.len(), 1024);
    assert!(out.iter().all(|f| *f == [0.0, 0.0]));
}

#[test]
fn test_impulse_returns_on_first_tap() {
    let store = impulse_store(SR as usize);
    let config = EngineConfig::default();
    let feedback = config.echo.feedback;
    let mut engine = Engine::new(store, config);
    let (tap1, tap2) = engine.echo().taps();
    assert_eq!(tap1, 15_435);

    let controls = ControlSnapshot {
        echo_mix: 0.5,
        ..ControlSnapshot::transparent()
    };
    let blocks = tap1 / 1024 + 2;
    let out = render_blocks(&mut engine, &controls, blocks, 1024);

    let expected = 1.0 * feedback * 0.5;
    assert!(
        (out[tap1][0] - expected).abs() < 1e-6,
        "tap1 echo {} expected {}",
        out[tap1][0],
        expected
    );
    assert!(out[1..tap1].iter().all(|f| *f == [0.0, 0.0]));
    assert!(tap2 > out.len());
}

#[test]
fn test_reset_command_clears_effects_and_keeps_position() {
    let mut engine = Engine::new(noise_store(30_000, 9), EngineConfig::default());
    let controls = ControlSnapshot {
        cutoff: 0.5,
        echo_mix: 0.8,
        ..ControlSnapshot::transparent()
    };
    render_blocks(&mut engine, &controls, 20, 1024);
    let position = engine.position();

    let mut queue = VecDeque::from([EngineCommand::ClearEffects]);
    engine.drain_commands(&mut queue);

    assert_eq!(engine.position(), position);
    assert_eq!(engine.echo().write_pos(), 0);
    assert!(!engine.filter().is_engaged());
}

#[test]
fn test_render_reads_surface_once_per_block() {
    let store = noise_store(4_096, 1);
    let mut engine = Engine::new(store, EngineConfig::default());
    let params = ParamSurface::new();
    params.set_volume(f32::NAN);
    params.set_pitch(100.0);

    let mut block = vec![[0.0; 2]; 128];
    let used = engine.render(&params, &mut block);

    assert_eq!(used.volume, ControlSnapshot::default().volume);
    assert_eq!(used.pitch, 4.0);
    assert!((engine.position() - 512.0).abs() < 1e-9);
}

#[test]
fn test_one_bad_block_does_not_poison_the_echo() {
    let store = Arc::new(SampleBuffer::new(vec![[0.5, -0.5]; 8_192], SR, "dc").unwrap());
    let mut engine = Engine::new(store, EngineConfig::default());
    let mut block = vec![[0.0; 2]; 1024];

    let bad = ControlSnapshot {
        distortion: f32::NAN,
        echo_mix: f32::INFINITY,
        ..ControlSnapshot::transparent()
    };
    engine.process_block(&bad, &mut block);
    assert!(block.iter().all(|f| f[0].is_finite() && f[1].is_finite()));

    let good = ControlSnapshot {
        echo_mix: 0.5,
        ..ControlSnapshot::transparent()
    };
    for i in 0..200 {
        engine.process_block(&good, &mut block);
        let silent = block.iter().filter(|f| f[0] == 0.0 && f[1] == 0.0).count();
        assert_eq!(silent, 0, "block {} has {} silent frames", i, silent);
    }
}
