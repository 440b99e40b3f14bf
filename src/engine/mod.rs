//! Block renderer.
//!
//! Control flow for every block, with controls read once at block entry:
//!
//!   transport/resampler -> low-pass -> distortion -> echo -> pan/volume/clamp
//!
//! [`Engine::process_block`] is the pure core: controls in, frames out, no
//! device involved. The audio callback wraps it with [`Engine::render`] or
//! [`Engine::render_interleaved`]. Nothing on this path allocates, blocks,
//! logs or returns an error.

pub mod command;

use std::sync::Arc;

use tracing::warn;

use crate::{
    config::EngineConfig,
    dsp::{distortion::distort, pan::finalize, AdaptiveLowPass, EchoNetwork, Transport},
    params::{ControlSnapshot, ParamSurface, Seek},
    sample::SampleBuffer,
    Frame, MAX_BLOCK_SIZE,
};

pub use command::{CommandReceiver, EngineCommand};

pub struct Engine {
    config: EngineConfig,
    store: Arc<SampleBuffer>,
    transport: Transport,
    filter: AdaptiveLowPass,
    echo: EchoNetwork,
    /// Last rendered block, kept for display.
    vis: Vec<Frame>,
    vis_len: usize,
    /// Scratch for de-interleaving device buffers.
    scratch: Vec<Frame>,
}

impl Engine {
    /// Allocate every buffer the render path will use.
    pub fn new(store: Arc<SampleBuffer>, config: EngineConfig) -> Self {
        let mut config = config.validated();
        // The store's rate wins so filter and echo timing agree.
        if store.sample_rate() != config.sample_rate {
            warn!(
                store_rate = store.sample_rate(),
                config_rate = config.sample_rate,
                "sample rate mismatch, using the store's rate"
            );
            config.sample_rate = store.sample_rate();
        }
        let (tap1, tap2) = config.tap_lengths();
        let sample_rate = config.sample_rate as f32;

        Self {
            transport: Transport::new(store.len()),
            filter: AdaptiveLowPass::new(&config.filter, sample_rate),
            echo: EchoNetwork::new(&config.echo, tap1, tap2),
            vis: vec![[0.0; 2]; MAX_BLOCK_SIZE],
            vis_len: 0,
            scratch: vec![[0.0; 2]; MAX_BLOCK_SIZE],
            store,
            config,
        }
    }

    /// Render `out` with a single control snapshot.
    ///
    /// When not playing, writes silence and leaves the playhead where it is.
    /// Controls are clamped here as well, so callers may pass raw values.
    pub fn process_block(&mut self, controls: &ControlSnapshot, out: &mut [Frame]) {
        let controls = controls.clamped();
        if !controls.playing {
            out.fill([0.0; 2]);
            return;
        }

        let rate = controls.rate();
        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            self.transport.render(self.store.frames(), rate, chunk);
            self.filter.process(chunk, controls.cutoff);
            distort(chunk, controls.distortion, &self.config.distortion);
            // Always run: the history keeps recording at zero mix.
            self.echo.process(chunk, controls.echo_mix);
            finalize(chunk, controls.pan, controls.volume);
        }

        let keep = out.len().min(MAX_BLOCK_SIZE);
        self.vis[..keep].copy_from_slice(&out[out.len() - keep..]);
        self.vis_len = keep;
    }

    /// Snapshot `params` once and render `out`.
    pub fn render(&mut self, params: &ParamSurface, out: &mut [Frame]) -> ControlSnapshot {
        let controls = params.snapshot();
        self.process_block(&controls, out);
        controls
    }

    /// Render into an interleaved device buffer with `channels` channels.
    ///
    /// Channels beyond the first two are written as silence; a mono device
    /// gets the average of left and right.
    pub fn render_interleaved(
        &mut self,
        controls: &ControlSnapshot,
        data: &mut [f32],
        channels: usize,
    ) {
        if channels == 0 {
            return;
        }

        let total_frames = data.len() / channels;
        let mut frames_written = 0;
        while frames_written < total_frames {
            let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);

            let mut block = std::mem::take(&mut self.scratch);
            self.process_block(controls, &mut block[..frames_to_render]);

            let out_off = frames_written * channels;
            for (i, frame) in block[..frames_to_render].iter().enumerate() {
                let dst = &mut data[out_off + i * channels..out_off + (i + 1) * channels];
                if channels == 1 {
                    dst[0] = 0.5 * (frame[0] + frame[1]);
                } else {
                    dst[0] = frame[0];
                    dst[1] = frame[1];
                    dst[2..].fill(0.0);
                }
            }
            self.scratch = block;

            frames_written += frames_to_render;
        }

        // Trailing partial frame, if the device buffer is ragged.
        data[total_frames * channels..].fill(0.0);
    }

    /// Apply every queued command. Call at block entry.
    pub fn drain_commands<R: CommandReceiver>(&mut self, rx: &mut R) {
        while let Some(cmd) = rx.pop() {
            self.apply(cmd);
        }
    }

    pub fn apply(&mut self, cmd: EngineCommand) {
        match cmd {
            EngineCommand::ClearEffects => self.reset_effects(),
            EngineCommand::Seek(target) => self.seek(target),
        }
    }

    /// Clear filter memory and echo history without stopping playback.
    pub fn reset_effects(&mut self) {
        self.filter.reset();
        self.echo.reset();
    }

    /// Move the playhead; out-of-range targets clamp into `[0, len)`.
    pub fn seek(&mut self, target: Seek) {
        self.transport
            .set_position(target.resolve(self.store.len()));
    }

    /// Playhead in source frames.
    pub fn position(&self) -> f64 {
        self.transport.position()
    }

    /// Playhead in seconds.
    pub fn position_secs(&self) -> f64 {
        self.transport.position() / self.store.sample_rate() as f64
    }

    /// Playhead as a fraction in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        self.transport.progress()
    }

    pub fn duration_secs(&self) -> f64 {
        self.store.duration_secs()
    }

    pub fn label(&self) -> &str {
        self.store.label()
    }

    /// The most recently rendered frames (empty before the first block).
    pub fn snapshot(&self) -> &[Frame] {
        &self.vis[..self.vis_len]
    }

    pub fn store(&self) -> &Arc<SampleBuffer> {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn filter(&self) -> &AdaptiveLowPass {
        &self.filter
    }

    pub fn echo(&self) -> &EchoNetwork {
        &self.echo
    }
}
