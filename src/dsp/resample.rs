//! Transport / resampler
//!
//! Playback reads the source at a fractional position that advances by
//! `rate` source frames per output frame. Any rate is allowed, including
//! negative ones for reverse playback; every position is folded back into
//! `[0, len)` so the source loops in both directions.
//!
//!   t_i  = (pos + i * rate) mod len
//!   i0   = floor(t_i)          i1 = (i0 + 1) mod len
//!   out  = lerp(src[i0], src[i1], t_i - i0)
//!
//! At rate 1.0 and an integral position `frac` is exactly zero and the
//! source is reproduced bit-for-bit.

use crate::Frame;

/// Euclidean modulo into `[0, len)`. Handles negative input and the
/// floating-point edge where `rem_euclid` rounds up to `len`.
#[inline]
pub fn wrap_position(x: f64, len: f64) -> f64 {
    let r = x.rem_euclid(len);
    if r >= len || !r.is_finite() {
        0.0
    } else {
        r
    }
}

/// Fill `out` from `source` starting at `pos` with step `rate`.
///
/// Returns the position after the block, `(pos + out.len() * rate) mod len`.
pub fn render_positions(source: &[Frame], pos: f64, rate: f64, out: &mut [Frame]) -> f64 {
    let len = source.len();
    if len == 0 {
        out.fill([0.0; 2]);
        return 0.0;
    }
    let n = len as f64;

    for (i, frame) in out.iter_mut().enumerate() {
        let t = wrap_position(pos + i as f64 * rate, n);
        let floor = t.floor();
        let i0 = (floor as usize) % len;
        let i1 = (i0 + 1) % len;
        let frac = (t - floor) as f32;

        let a = source[i0];
        let b = source[i1];
        *frame = [a[0] + (b[0] - a[0]) * frac, a[1] + (b[1] - a[1]) * frac];
    }

    wrap_position(pos + out.len() as f64 * rate, n)
}

/// Playhead over a fixed-length source.
#[derive(Debug, Clone)]
pub struct Transport {
    pos: f64,
    len: usize,
}

impl Transport {
    pub fn new(len: usize) -> Self {
        Self { pos: 0.0, len }
    }

    /// Render one block at `rate` and advance.
    pub fn render(&mut self, source: &[Frame], rate: f64, out: &mut [Frame]) {
        self.pos = render_positions(source, self.pos, rate, out);
    }

    /// Current position in source frames, always in `[0, len)`.
    pub fn position(&self) -> f64 {
        self.pos
    }

    /// Move the playhead. The caller is responsible for clamping; anything
    /// outside `[0, len)` is wrapped as a last resort.
    pub fn set_position(&mut self, pos: f64) {
        self.pos = if self.len == 0 {
            0.0
        } else {
            wrap_position(pos, self.len as f64)
        };
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Position as a fraction of the source length.
    pub fn progress(&self) -> f64 {
        if self.len == 0 {
            0.0
        } else {
            self.pos / self.len as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize) -> Vec<Frame> {
        (0..len).map(|i| [i as f32, -(i as f32)]).collect()
    }

    #[test]
    fn test_wrap_position_negative() {
        assert!((wrap_position(-1.5, 10.0) - 8.5).abs() < 1e-12);
        assert!((wrap_position(23.0, 10.0) - 3.0).abs() < 1e-12);
        let tiny = wrap_position(-1e-20, 10.0);
        assert!((0.0..10.0).contains(&tiny));
    }

    #[test]
    fn test_unity_rate_reproduces_source() {
        let source = ramp(16);
        let mut out = [[0.0; 2]; 8];
        let next = render_positions(&source, 4.0, 1.0, &mut out);

        assert_eq!(&out[..], &source[4..12]);
        assert_eq!(next, 12.0);
    }

    #[test]
    fn test_half_rate_interpolates() {
        let source = ramp(8);
        let mut out = [[0.0; 2]; 4];
        render_positions(&source, 0.0, 0.5, &mut out);

        assert!((out[1][0] - 0.5).abs() < 1e-6);
        assert!((out[3][1] + 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_reverse_wraps_through_zero() {
        let source = ramp(10);
        let mut out = [[0.0; 2]; 4];
        let next = render_positions(&source, 1.0, -1.0, &mut out);

        assert_eq!(out[0][0], 1.0);
        assert_eq!(out[1][0], 0.0);
        assert_eq!(out[2][0], 9.0);
        assert_eq!(out[3][0], 8.0);
        assert_eq!(next, 7.0);
    }

    #[test]
    fn test_interpolation_wraps_last_to_first() {
        let source = ramp(4);
        let mut out = [[0.0; 2]; 1];
        render_positions(&source, 3.5, 1.0, &mut out);
        // Halfway between frame 3 and frame 0
        assert!((out[0][0] - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_transport_position_stays_in_range() {
        let source = ramp(100);
        let mut transport = Transport::new(source.len());
        let mut out = [[0.0; 2]; 64];

        for rate in [4.0 * 3.0, -12.0, 0.25, -0.0625, 3.7] {
            for _ in 0..50 {
                transport.render(&source, rate, &mut out);
                let pos = transport.position();
                assert!((0.0..100.0).contains(&pos), "pos {} out of range", pos);
            }
        }
    }
}
