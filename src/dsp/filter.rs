use std::f64::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{config::FilterConfig, Frame};

/*
Adaptive low-pass
=================

| cutoff control   | filter state                  | block                 |
| ---------------- | ----------------------------- | --------------------- |
| >= bypass (0.97) | invalidated (sentinel, zeros) | passes through        |
| moved > epsilon  | coefficients redesigned       | filtered              |
| moved <= epsilon | coefficients kept             | filtered              |
| output non-finite| memory cleared, invalidated   | bad samples -> 0.0    |

The cascade is a Butterworth low-pass split into second-order sections.
Section k of an N-section cascade uses

  Q_k = 1 / (2 cos(pi (2k + 1) / 4N))

with the bilinear-transform biquad below, which gives the same response as
a textbook Butterworth design of order 2N (2 sections -> 24 dB/octave).

Redesigning only on a meaningful change keeps the per-block cost low and
avoids the audible stepping a fresh design on every block would cause.
Section memory survives a redesign so sweeps stay click-free.
*/

const SENTINEL: f32 = -1.0;

/// Normalized biquad coefficients (`a0 == 1`).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Biquad {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl Biquad {
    /// Pass-through section.
    pub const IDENTITY: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Low-pass section at `normalized` (fraction of Nyquist, `0 < n < 1`) with quality `q`.
    pub fn lowpass(normalized: f64, q: f64) -> Self {
        let w0 = PI * normalized;
        let (sin_w, cos_w) = w0.sin_cos();
        let alpha = sin_w / (2.0 * q);
        let a0 = 1.0 + alpha;

        let b1 = (1.0 - cos_w) / a0;
        Self {
            b0: b1 * 0.5,
            b1,
            b2: b1 * 0.5,
            a1: -2.0 * cos_w / a0,
            a2: (1.0 - alpha) / a0,
        }
    }

    /// Direct Form II transposed; `z` is this section's two-element memory.
    #[inline]
    pub fn process(&self, x: f64, z: &mut [f64; 2]) -> f64 {
        let y = self.b0 * x + z[0];
        z[0] = self.b1 * x - self.a1 * y + z[1];
        z[1] = self.b2 * x - self.a2 * y;
        y
    }
}

/// Quality factor of section `k` in an `sections`-long Butterworth cascade.
pub fn butterworth_q(k: usize, sections: usize) -> f64 {
    let order = (2 * sections) as f64;
    1.0 / (2.0 * (PI * (2 * k + 1) as f64 / (2.0 * order)).cos())
}

/// Design every section of the cascade for `normalized` cutoff.
pub fn design_cascade(normalized: f64, out: &mut [Biquad]) {
    let sections = out.len();
    for (k, section) in out.iter_mut().enumerate() {
        *section = Biquad::lowpass(normalized, butterworth_q(k, sections));
    }
}

/// Stereo Butterworth low-pass driven by a `0..1` cutoff control.
pub struct AdaptiveLowPass {
    config: FilterConfig,
    sample_rate: f32,
    sections: Vec<Biquad>,
    // Per-channel memory, one [z1, z2] pair per section.
    memory: [Vec<[f64; 2]>; 2],
    last_normalized: f32,
    redesigns: u64,
}

impl AdaptiveLowPass {
    pub fn new(config: &FilterConfig, sample_rate: f32) -> Self {
        let order = config.sections.max(1);
        Self {
            config: config.clone(),
            sample_rate,
            sections: vec![Biquad::IDENTITY; order],
            memory: [vec![[0.0; 2]; order], vec![[0.0; 2]; order]],
            last_normalized: SENTINEL,
            redesigns: 0,
        }
    }

    /// Map the control to Hz on an exponential curve from `min_hz` to `max_hz`.
    pub fn cutoff_hz(&self, cutoff: f32) -> f32 {
        let ratio = self.config.max_hz / self.config.min_hz;
        (self.config.min_hz * ratio.powf(cutoff)).max(self.config.min_hz)
    }

    /// Cutoff as a fraction of Nyquist, capped below 1.
    pub fn normalized(&self, cutoff: f32) -> f32 {
        let nyquist = self.sample_rate * 0.5;
        (self.cutoff_hz(cutoff) / nyquist).min(self.config.max_normalized)
    }

    /// Filter `block` in place. Bypasses (and invalidates state) when the
    /// control is at or above the bypass threshold.
    pub fn process(&mut self, block: &mut [Frame], cutoff: f32) {
        if cutoff >= self.config.bypass_threshold {
            if self.is_engaged() {
                self.invalidate();
            }
            return;
        }

        let normalized = self.normalized(cutoff);
        if !self.is_engaged()
            || (normalized - self.last_normalized).abs() > self.config.recompute_epsilon
        {
            design_cascade(normalized as f64, &mut self.sections);
            self.last_normalized = normalized;
            self.redesigns += 1;
        }

        // Memory must match the cascade; a mismatch means reset, never truncation.
        for channel in self.memory.iter_mut() {
            if channel.len() != self.sections.len() {
                *channel = vec![[0.0; 2]; self.sections.len()];
            }
        }

        let mut unstable = false;
        for frame in block.iter_mut() {
            for (ch, sample) in frame.iter_mut().enumerate() {
                let mut x = *sample as f64;
                for (section, z) in self.sections.iter().zip(self.memory[ch].iter_mut()) {
                    x = section.process(x, z);
                }
                if x.is_finite() {
                    *sample = x as f32;
                } else {
                    *sample = 0.0;
                    unstable = true;
                }
            }
        }

        if unstable {
            self.invalidate();
        }
    }

    /// Change the number of second-order sections. Reallocates, so call it
    /// outside the audio callback.
    pub fn set_sections(&mut self, sections: usize) {
        let sections = sections.max(1);
        self.config.sections = sections;
        self.sections = vec![Biquad::IDENTITY; sections];
        self.memory = [vec![[0.0; 2]; sections], vec![[0.0; 2]; sections]];
        self.last_normalized = SENTINEL;
    }

    /// Forget coefficients and clear memory so the next engage starts clean.
    pub fn invalidate(&mut self) {
        self.last_normalized = SENTINEL;
        for channel in self.memory.iter_mut() {
            channel.fill([0.0; 2]);
        }
    }

    pub fn reset(&mut self) {
        self.invalidate();
    }

    /// Whether coefficients are designed and in use.
    pub fn is_engaged(&self) -> bool {
        self.last_normalized != SENTINEL
    }

    pub fn sections(&self) -> usize {
        self.sections.len()
    }

    /// Filter order (two poles per section).
    pub fn order(&self) -> usize {
        self.sections.len() * 2
    }

    pub fn memory_len(&self, channel: usize) -> usize {
        self.memory[channel].len()
    }

    pub fn last_normalized(&self) -> Option<f32> {
        self.is_engaged().then_some(self.last_normalized)
    }

    /// How many times coefficients were designed.
    pub fn redesigns(&self) -> u64 {
        self.redesigns
    }
}
