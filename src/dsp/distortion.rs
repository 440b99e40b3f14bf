//! Distortion / Waveshaping
//!
//! Distortion adds harmonics by reshaping the waveform. The playback chain
//! uses a single control, `amount` in `0..1`, mapped to a drive:
//!
//!   drive  = 1 + amount * drive_scale      (drive_scale = 25)
//!   output = tanh(input * drive)
//!
//! # Amount Values
//!
//!   0.00 - 0.01 = Bypassed (block untouched)
//!   0.05 - 0.2  = Warm saturation
//!   0.3  - 0.6  = Obvious distortion
//!   0.7+        = Heavy, nearly square
//!
//! tanh never leaves `(-1, 1)`, so the stage also acts as a limiter.

use crate::{config::DistortionConfig, Frame};

/// Soft clipping using the tanh transfer function.
#[inline]
pub fn soft_clip(sample: f32, drive: f32) -> f32 {
    (sample * drive).tanh()
}

/// Drive for a `0..1` amount.
#[inline]
pub fn drive_for(amount: f32, config: &DistortionConfig) -> f32 {
    1.0 + amount * config.drive_scale
}

/// Apply the soft clipper to a stereo block in place.
///
/// Amounts below the configured threshold leave the block untouched.
pub fn distort(block: &mut [Frame], amount: f32, config: &DistortionConfig) {
    if amount < config.threshold {
        return;
    }

    let drive = drive_for(amount, config);
    for frame in block.iter_mut() {
        frame[0] = soft_clip(frame[0], drive);
        frame[1] = soft_clip(frame[1], drive);
    }
}
