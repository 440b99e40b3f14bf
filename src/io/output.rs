//! cpal driver around [`Engine`].
//!
//! The engine is built on `start` and moved into the output callback; the
//! controlling thread keeps only the shared [`ParamSurface`], a command ring
//! into the callback and a frame ring back out for display.
//!
//! ```text
//! Stopped --start--> Playing <--toggle--> Paused
//!    ^                  |                    |
//!    +------stop--------+--------stop--------+
//! ```

use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{debug, info, warn};

use crate::{
    config::EngineConfig,
    engine::{Engine, EngineCommand},
    params::{AtomicF64, ParamSurface, Seek},
    sample::SampleBuffer,
    DeviceError, Frame, MAX_BLOCK_SIZE,
};

/// Capacity of the UI -> audio command ring.
const COMMAND_RING: usize = 64;
/// Capacity in blocks of the audio -> UI frame ring.
const VIS_RING_BLOCKS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// No output stream.
    Stopped,
    Playing,
    /// Stream running, rendering silence with the playhead held.
    Paused,
}

pub struct Player {
    store: Arc<SampleBuffer>,
    config: EngineConfig,
    params: Arc<ParamSurface>,
    playhead: Arc<AtomicF64>,
    stream: Option<cpal::Stream>,
    cmd_tx: Option<Producer<EngineCommand>>,
    vis_rx: Option<Consumer<Frame>>,
}

impl Player {
    pub fn new(store: Arc<SampleBuffer>, config: EngineConfig) -> Self {
        Self::with_params(store, config, Arc::new(ParamSurface::new()))
    }

    /// Share an existing control surface (e.g. one the UI already holds).
    pub fn with_params(
        store: Arc<SampleBuffer>,
        config: EngineConfig,
        params: Arc<ParamSurface>,
    ) -> Self {
        Self {
            store,
            config: config.validated(),
            params,
            playhead: Arc::new(AtomicF64::new(0.0)),
            stream: None,
            cmd_tx: None,
            vis_rx: None,
        }
    }

    /// Open the default output device and start rendering. No-op when running.
    pub fn start(&mut self) -> Result<(), DeviceError> {
        if self.stream.is_some() {
            return Ok(());
        }

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(DeviceError::NoOutputDevice)?;
        debug!(
            host = ?host.id(),
            device = %device.name().unwrap_or_else(|_| String::from("unknown")),
            "opening output device"
        );

        let stream_config = self.choose_config(&device)?;
        let channels = stream_config.channels as usize;

        let mut engine = Engine::new(self.store.clone(), self.config.clone());
        engine.seek(Seek::Frames(self.playhead.load()));

        let (cmd_tx, mut cmd_rx) = RingBuffer::<EngineCommand>::new(COMMAND_RING);
        let (mut vis_tx, vis_rx) = RingBuffer::<Frame>::new(MAX_BLOCK_SIZE * VIS_RING_BLOCKS);

        let params = self.params.clone();
        let playhead = self.playhead.clone();

        let stream = device.build_output_stream(
            &stream_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                engine.drain_commands(&mut cmd_rx);

                let controls = params.snapshot();
                engine.render_interleaved(&controls, data, channels);

                if controls.playing {
                    // Drop on overflow; the display only needs recent audio.
                    for &frame in engine.snapshot() {
                        if vis_tx.push(frame).is_err() {
                            break;
                        }
                    }
                }
                playhead.store(engine.position());
            },
            |err| warn!(%err, "output stream error"),
            None,
        )?;

        stream.play()?;
        info!(
            sample_rate = stream_config.sample_rate.0,
            channels,
            buffer = ?stream_config.buffer_size,
            "output stream started"
        );

        self.stream = Some(stream);
        self.cmd_tx = Some(cmd_tx);
        self.vis_rx = Some(vis_rx);
        Ok(())
    }

    /// Halt the callback, then release the stream and its engine.
    pub fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(err) = stream.pause() {
                warn!(%err, "failed to pause output stream");
            }
            drop(stream);
            info!("output stream stopped");
        }
        self.cmd_tx = None;
        self.vis_rx = None;
    }

    /// Restore default controls and clear effect state. Playback continues.
    pub fn reset(&mut self) {
        self.params.reset_defaults();
        self.send(EngineCommand::ClearEffects);
    }

    /// Move the playhead, effective at the next block boundary.
    pub fn seek(&mut self, target: Seek) {
        let frames = target.resolve(self.store.len());
        self.playhead.store(frames);
        self.send(EngineCommand::Seek(Seek::Frames(frames)));
    }

    /// Seek relative to the current position, in seconds.
    pub fn nudge(&mut self, seconds: f64) {
        let delta = seconds * self.store.sample_rate() as f64;
        self.seek(Seek::Frames(self.playhead.load() + delta));
    }

    pub fn toggle_playing(&self) {
        self.params.toggle_playing();
    }

    fn send(&mut self, cmd: EngineCommand) {
        if let Some(tx) = self.cmd_tx.as_mut() {
            if tx.push(cmd).is_err() {
                warn!(?cmd, "command ring full, dropping command");
            }
        }
    }

    /// Move up to `max` rendered frames into `dst`. Returns how many arrived.
    pub fn drain_visualization(&mut self, dst: &mut Vec<Frame>, max: usize) -> usize {
        let Some(rx) = self.vis_rx.as_mut() else {
            return 0;
        };
        let mut received = 0;
        while received < max {
            match rx.pop() {
                Ok(frame) => {
                    dst.push(frame);
                    received += 1;
                }
                Err(_) => break,
            }
        }
        received
    }

    pub fn status(&self) -> PlaybackStatus {
        match (&self.stream, self.params.playing()) {
            (None, _) => PlaybackStatus::Stopped,
            (Some(_), true) => PlaybackStatus::Playing,
            (Some(_), false) => PlaybackStatus::Paused,
        }
    }

    pub fn params(&self) -> &Arc<ParamSurface> {
        &self.params
    }

    /// Playhead in source frames, at most one block stale.
    pub fn position(&self) -> f64 {
        self.playhead.load()
    }

    pub fn position_secs(&self) -> f64 {
        self.position() / self.store.sample_rate() as f64
    }

    pub fn progress(&self) -> f64 {
        (self.position() / self.store.len() as f64).clamp(0.0, 1.0)
    }

    pub fn duration_secs(&self) -> f64 {
        self.store.duration_secs()
    }

    pub fn label(&self) -> &str {
        self.store.label()
    }

    pub fn sample_rate(&self) -> u32 {
        self.store.sample_rate()
    }

    fn choose_config(&self, device: &cpal::Device) -> Result<cpal::StreamConfig, DeviceError> {
        let rate = self.store.sample_rate();
        let ranges: Vec<_> = device.supported_output_configs()?.collect();
        pick_config(&ranges, rate, self.config.block_size)
            .ok_or(DeviceError::NoSupportedConfig(rate))
    }
}

/// f32 at `rate`, stereo when offered, otherwise the first f32 layout the
/// device has (the engine downmixes to mono or pads extra channels). Uses
/// `block_size` as a fixed buffer when the device range allows it.
fn pick_config(
    ranges: &[cpal::SupportedStreamConfigRange],
    rate: u32,
    block_size: usize,
) -> Option<cpal::StreamConfig> {
    let usable = |range: &&cpal::SupportedStreamConfigRange| {
        range.channels() > 0
            && range.sample_format() == cpal::SampleFormat::F32
            && range.min_sample_rate().0 <= rate
            && range.max_sample_rate().0 >= rate
    };
    let range = ranges
        .iter()
        .filter(usable)
        .find(|range| range.channels() == 2)
        .or_else(|| ranges.iter().find(usable))?;

    let buffer_size = match *range.buffer_size() {
        cpal::SupportedBufferSize::Range { min, max }
            if (min as usize..=max as usize).contains(&block_size) =>
        {
            cpal::BufferSize::Fixed(block_size as u32)
        }
        _ => cpal::BufferSize::Default,
    };

    let mut config: cpal::StreamConfig = range.with_sample_rate(cpal::SampleRate(rate)).into();
    config.buffer_size = buffer_size;
    Some(config)
}

impl Drop for Player {
    fn drop(&mut self) {
        self.stop();
    }
}
