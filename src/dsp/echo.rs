//! Echo network
//!
//! A circular stereo history with two fixed read taps and a feedback write.
//! For each block, with `wp` the write pointer and `C` the capacity:
//!
//!   tap1 = history[(wp - tap1_len) mod C ..][..n]
//!   tap2 = history[(wp - tap2_len) mod C ..][..n]
//!   wet  = dry + tap1 * mix + tap2 * mix * tap2_gain
//!   history[wp ..][..n] = wet * feedback
//!   wp   = (wp + n) mod C
//!
//! Both taps are read before anything is written: a tap region may overlap
//! the region this block overwrites, and the block still needs the old data.
//!
//! Below the mix threshold the block passes through dry, but the dry audio is
//! still written (unscaled). The history therefore always holds recent audio
//! and raising the mix later brings in echoes instead of a burst of silence.

use crate::{config::EchoConfig, Frame, MAX_BLOCK_SIZE};

pub struct EchoNetwork {
    history: Vec<Frame>,
    write_pos: usize,
    tap1: usize,
    tap2: usize,
    feedback: f32,
    mix_threshold: f32,
    tap2_gain: f32,
    // Pre-allocated tap reads for allocation-free rendering
    tap1_buf: Vec<Frame>,
    tap2_buf: Vec<Frame>,
}

impl EchoNetwork {
    /// Build from tap lengths in frames. `tap1 < tap2` is enforced by sorting.
    pub fn new(config: &EchoConfig, tap1: usize, tap2: usize) -> Self {
        let (tap1, tap2) = if tap1 <= tap2 { (tap1, tap2) } else { (tap2, tap1) };
        let tap1 = tap1.max(1);
        let tap2 = tap2.max(tap1 + 1);
        let capacity = Self::capacity_for(tap2);

        Self {
            history: vec![[0.0; 2]; capacity],
            write_pos: 0,
            tap1,
            tap2,
            feedback: config.feedback,
            mix_threshold: config.mix_threshold,
            tap2_gain: config.tap2_gain,
            tap1_buf: vec![[0.0; 2]; MAX_BLOCK_SIZE],
            tap2_buf: vec![[0.0; 2]; MAX_BLOCK_SIZE],
        }
    }

    /// Smallest capacity strictly above `3 * longest_tap + MAX_BLOCK_SIZE`.
    pub fn capacity_for(longest_tap: usize) -> usize {
        3 * longest_tap + MAX_BLOCK_SIZE + 1
    }

    /// Process `block` in place and return the wet signal in it.
    pub fn process(&mut self, block: &mut [Frame], mix: f32) {
        for chunk in block.chunks_mut(MAX_BLOCK_SIZE) {
            self.process_chunk(chunk, mix);
        }
    }

    fn process_chunk(&mut self, block: &mut [Frame], mix: f32) {
        let n = block.len();
        let capacity = self.history.len();

        // Reads first: the write below may land on data these taps still need.
        let start1 = (self.write_pos + capacity - self.tap1) % capacity;
        let start2 = (self.write_pos + capacity - self.tap2) % capacity;
        read_wrapped(&self.history, start1, &mut self.tap1_buf[..n]);
        read_wrapped(&self.history, start2, &mut self.tap2_buf[..n]);

        if mix > self.mix_threshold {
            let g1 = mix;
            let g2 = mix * self.tap2_gain;
            for ((frame, t1), t2) in block
                .iter_mut()
                .zip(&self.tap1_buf[..n])
                .zip(&self.tap2_buf[..n])
            {
                frame[0] += t1[0] * g1 + t2[0] * g2;
                frame[1] += t1[1] * g1 + t2[1] * g2;
            }
            write_wrapped(&mut self.history, self.write_pos, block, self.feedback);
        } else {
            write_wrapped(&mut self.history, self.write_pos, block, 1.0);
        }

        self.write_pos = (self.write_pos + n) % capacity;
    }

    /// Silence the history without touching the tap layout.
    pub fn reset(&mut self) {
        self.history.fill([0.0; 2]);
        self.write_pos = 0;
    }

    pub fn capacity(&self) -> usize {
        self.history.len()
    }

    pub fn write_pos(&self) -> usize {
        self.write_pos
    }

    pub fn taps(&self) -> (usize, usize) {
        (self.tap1, self.tap2)
    }

    pub fn feedback(&self) -> f32 {
        self.feedback
    }
}

/// Copy `dst.len()` frames starting at `start`, splitting at the buffer end.
fn read_wrapped(history: &[Frame], start: usize, dst: &mut [Frame]) {
    let n = dst.len();
    let first = (history.len() - start).min(n);
    dst[..first].copy_from_slice(&history[start..start + first]);
    if first < n {
        dst[first..].copy_from_slice(&history[..n - first]);
    }
}

/// Write `src * scale` starting at `start`, splitting at the buffer end.
/// Non-finite samples are stored as silence.
fn write_wrapped(history: &mut [Frame], start: usize, src: &[Frame], scale: f32) {
    let n = src.len();
    let first = (history.len() - start).min(n);
    let (head, tail) = src.split_at(first);

    for (dst, s) in history[start..start + first].iter_mut().zip(head) {
        *dst = [finite(s[0] * scale), finite(s[1] * scale)];
    }
    for (dst, s) in history[..tail.len()].iter_mut().zip(tail) {
        *dst = [finite(s[0] * scale), finite(s[1] * scale)];
    }
}

/// The history must never hold NaN or inf: feedback would recirculate it forever.
#[inline]
fn finite(x: f32) -> f32 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}
