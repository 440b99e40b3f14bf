//! Decoded source audio.
//!
//! A [`SampleBuffer`] is built once (by [`loader`] or directly from frames)
//! and never mutated afterwards; the engine only ever reads it.

pub mod loader;

use crate::{Frame, LoadError};

pub use loader::load_file;

/// Immutable stereo frames at a fixed sample rate. Never empty.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    frames: Vec<Frame>,
    sample_rate: u32,
    label: String,
}

impl SampleBuffer {
    /// Wrap already-normalized frames. Samples are clamped to `[-1, 1]` and
    /// non-finite samples are replaced with silence.
    pub fn new(
        mut frames: Vec<Frame>,
        sample_rate: u32,
        label: impl Into<String>,
    ) -> Result<Self, LoadError> {
        if frames.is_empty() {
            return Err(LoadError::Empty);
        }

        for frame in frames.iter_mut() {
            for s in frame.iter_mut() {
                *s = if s.is_finite() { s.clamp(-1.0, 1.0) } else { 0.0 };
            }
        }

        Ok(Self {
            frames,
            sample_rate,
            label: label.into(),
        })
    }

    /// `seconds` of digital silence, handy for tests and benches.
    pub fn silence(seconds: f32, sample_rate: u32) -> Self {
        let len = ((seconds * sample_rate as f32) as usize).max(1);
        Self {
            frames: vec![[0.0; 2]; len],
            sample_rate,
            label: String::from("silence"),
        }
    }

    #[inline]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false; kept for API symmetry with slices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Display label (file name for loaded sources).
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Total duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames.len() as f64 / self.sample_rate as f64
    }
}
