//! Engine tuning.
//!
//! Everything here is fixed for the lifetime of an [`Engine`](crate::Engine);
//! the live knobs users turn belong to [`ParamSurface`](crate::ParamSurface).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{MAX_BLOCK_SIZE, WORKING_SAMPLE_RATE};

/// Longest accepted echo tap. The history holds three times this much audio.
pub const MAX_TAP_SECS: f32 = 5.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Working sample rate. Sources are resampled to it at load time.
    pub sample_rate: u32,
    /// Device buffer size requested from the output backend.
    pub block_size: usize,
    pub filter: FilterConfig,
    pub echo: EchoConfig,
    pub distortion: DistortionConfig,
}

/*
Cutoff curve
------------

  hz = max(min_hz, min_hz * (max_hz / min_hz) ^ cutoff)

  cutoff 0.0  -> 60 Hz     (muffled)
  cutoff 0.5  -> ~1.1 kHz
  cutoff 0.97 -> ~17 kHz   (bypass threshold, filter leaves the chain)
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfig {
    pub min_hz: f32,
    pub max_hz: f32,
    /// Cutoff at or above which filtering is bypassed and state invalidated.
    pub bypass_threshold: f32,
    /// Minimum change of normalized cutoff that triggers a coefficient redesign.
    pub recompute_epsilon: f32,
    /// Upper bound of `hz / nyquist`, must stay below 1.
    pub max_normalized: f32,
    /// Number of second-order sections (2 = 4th-order rolloff).
    pub sections: usize,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct EchoConfig {
    pub tap1_secs: f32,
    pub tap2_secs: f32,
    /// Gain applied to the wet signal before it is written back.
    pub feedback: f32,
    /// Mix below this passes dry audio through (the history is still written).
    pub mix_threshold: f32,
    /// Relative level of the second tap.
    pub tap2_gain: f32,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct DistortionConfig {
    /// Amounts below this leave the block untouched.
    pub threshold: f32,
    /// Drive at amount = 1 is `1 + drive_scale`.
    pub drive_scale: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: WORKING_SAMPLE_RATE,
            block_size: 1024,
            filter: FilterConfig::default(),
            echo: EchoConfig::default(),
            distortion: DistortionConfig::default(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_hz: 60.0,
            max_hz: 20_000.0,
            bypass_threshold: 0.97,
            recompute_epsilon: 0.003,
            max_normalized: 0.99,
            sections: 2,
        }
    }
}

impl Default for EchoConfig {
    fn default() -> Self {
        Self {
            tap1_secs: 0.35,
            tap2_secs: 0.55,
            feedback: 0.45,
            mix_threshold: 0.005,
            tap2_gain: 0.7,
        }
    }
}

impl Default for DistortionConfig {
    fn default() -> Self {
        Self {
            threshold: 0.01,
            drive_scale: 25.0,
        }
    }
}

impl EngineConfig {
    /// Replace unusable values with defaults so the render path can trust them.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();

        if self.sample_rate == 0 {
            self.sample_rate = defaults.sample_rate;
        }
        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            self.block_size = defaults.block_size;
        }

        let f = &mut self.filter;
        let fd = &defaults.filter;
        if !(f.min_hz.is_finite() && f.min_hz > 0.0) {
            f.min_hz = fd.min_hz;
        }
        if !(f.max_hz.is_finite() && f.max_hz > f.min_hz) {
            f.max_hz = fd.max_hz.max(f.min_hz * 2.0);
        }
        if !(0.0..=1.0).contains(&f.bypass_threshold) {
            f.bypass_threshold = fd.bypass_threshold;
        }
        if !(f.recompute_epsilon.is_finite() && f.recompute_epsilon >= 0.0) {
            f.recompute_epsilon = fd.recompute_epsilon;
        }
        if !(f.max_normalized > 0.0 && f.max_normalized < 1.0) {
            f.max_normalized = fd.max_normalized;
        }
        if f.sections == 0 {
            f.sections = fd.sections;
        }

        let e = &mut self.echo;
        let ed = &defaults.echo;
        if !(e.tap1_secs > 0.0 && e.tap1_secs <= MAX_TAP_SECS) {
            e.tap1_secs = ed.tap1_secs;
        }
        if !(e.tap2_secs > 0.0 && e.tap2_secs <= MAX_TAP_SECS) {
            e.tap2_secs = ed.tap2_secs;
        }
        if e.tap1_secs > e.tap2_secs {
            std::mem::swap(&mut e.tap1_secs, &mut e.tap2_secs);
        }
        if !(0.0..1.0).contains(&e.feedback) {
            e.feedback = ed.feedback;
        }
        if !(e.mix_threshold.is_finite() && e.mix_threshold >= 0.0) {
            e.mix_threshold = ed.mix_threshold;
        }
        if !(0.0..=1.0).contains(&e.tap2_gain) {
            e.tap2_gain = ed.tap2_gain;
        }

        let d = &mut self.distortion;
        if !(d.threshold.is_finite() && d.threshold >= 0.0) {
            d.threshold = defaults.distortion.threshold;
        }
        if !(d.drive_scale.is_finite() && d.drive_scale >= 0.0) {
            d.drive_scale = defaults.distortion.drive_scale;
        }

        self
    }

    /// Tap lengths in frames at the working rate, guaranteed `tap1 < tap2`.
    pub fn tap_lengths(&self) -> (usize, usize) {
        let sr = self.sample_rate as f32;
        let tap1 = ((self.echo.tap1_secs * sr).round() as usize).max(1);
        let tap2 = ((self.echo.tap2_secs * sr).round() as usize).max(tap1 + 1);
        (tap1, tap2)
    }
}
