//! Panner and output stage.
//!
//! Pan only ever narrows the far channel; the near channel stays at unity:
//!
//!   pan  -1.0  ->  L 1.0  R 0.0
//!   pan   0.0  ->  L 1.0  R 1.0
//!   pan  +1.0  ->  L 0.0  R 1.0

use crate::Frame;

/// `(left, right)` gains for `pan` in `[-1, 1]`.
#[inline]
pub fn pan_gains(pan: f32) -> (f32, f32) {
    ((1.0 - pan).min(1.0), (1.0 + pan).min(1.0))
}

/// Apply pan and volume, then hard-clamp to `[-1, 1]` in place.
///
/// Non-finite samples become silence so nothing unbounded reaches the device.
pub fn finalize(block: &mut [Frame], pan: f32, volume: f32) {
    let (left, right) = pan_gains(pan);
    let gains = [left * volume, right * volume];

    for frame in block.iter_mut() {
        for (sample, gain) in frame.iter_mut().zip(gains) {
            let y = *sample * gain;
            *sample = if y.is_finite() { y.clamp(-1.0, 1.0) } else { 0.0 };
        }
    }
}
