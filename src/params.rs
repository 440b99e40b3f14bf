//! Shared control surface.
//!
//! Controllers (UI, tests, anything on another thread) store plain scalars
//! here at any time. The audio thread takes one [`ControlSnapshot`] per block
//! and uses only that snapshot for the whole block, so a value changing
//! mid-block is seen at the next block boundary.
//!
//! Every field is an independent relaxed atomic: one writer per field, one
//! reader per block, no lock. Ranges are enforced when the snapshot is taken,
//! never on write, so a controller is never rejected.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// `f32` stored bit-for-bit in an `AtomicU32`.
#[derive(Debug)]
pub struct AtomicF32(AtomicU32);

impl AtomicF32 {
    pub fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    #[inline]
    pub fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

impl Default for AtomicF32 {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// `f64` stored bit-for-bit in an `AtomicU64`.
#[derive(Debug)]
pub struct AtomicF64(AtomicU64);

impl AtomicF64 {
    pub fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    #[inline]
    pub fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn store(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

impl Default for AtomicF64 {
    fn default() -> Self {
        Self::new(0.0)
    }
}

pub const PITCH_RANGE: (f32, f32) = (0.25, 4.0);
pub const SPEED_RANGE: (f32, f32) = (0.25, 3.0);

/// Per-block, range-clamped view of the controls.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlSnapshot {
    pub volume: f32,
    pub pitch: f32,
    pub speed: f32,
    pub cutoff: f32,
    pub echo_mix: f32,
    pub distortion: f32,
    pub pan: f32,
    pub reverse: bool,
    pub playing: bool,
}

impl Default for ControlSnapshot {
    fn default() -> Self {
        Self {
            volume: 0.7,
            pitch: 1.0,
            speed: 1.0,
            cutoff: 1.0,
            echo_mix: 0.0,
            distortion: 0.0,
            pan: 0.0,
            reverse: false,
            playing: true,
        }
    }
}

impl ControlSnapshot {
    /// Controls that leave the source untouched: unity gain, all effects off.
    pub fn transparent() -> Self {
        Self {
            volume: 1.0,
            ..Self::default()
        }
    }

    /// Signed playback rate in source frames per output frame.
    ///
    /// `clamp(pitch) * clamp(speed)`, negated when reversed.
    pub fn rate(&self) -> f64 {
        let pitch = self.pitch.clamp(PITCH_RANGE.0, PITCH_RANGE.1) as f64;
        let speed = self.speed.clamp(SPEED_RANGE.0, SPEED_RANGE.1) as f64;
        let rate = pitch * speed;
        if self.reverse {
            -rate
        } else {
            rate
        }
    }

    /// Apply the documented ranges. Non-finite inputs fall back to defaults.
    pub fn clamped(self) -> Self {
        let d = Self::default();
        Self {
            volume: finite_or(self.volume, d.volume).max(0.0),
            pitch: finite_or(self.pitch, d.pitch).clamp(PITCH_RANGE.0, PITCH_RANGE.1),
            speed: finite_or(self.speed, d.speed).clamp(SPEED_RANGE.0, SPEED_RANGE.1),
            cutoff: finite_or(self.cutoff, d.cutoff).clamp(0.0, 1.0),
            echo_mix: finite_or(self.echo_mix, d.echo_mix).clamp(0.0, 1.0),
            distortion: finite_or(self.distortion, d.distortion).clamp(0.0, 1.0),
            pan: finite_or(self.pan, d.pan).clamp(-1.0, 1.0),
            reverse: self.reverse,
            playing: self.playing,
        }
    }
}

#[inline]
fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Where to move the playhead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Seek {
    /// Fraction of the total length, `0.0..=1.0`.
    Fraction(f64),
    /// Absolute source frame position.
    Frames(f64),
}

impl Seek {
    /// Resolve to a position in `[0, len)`. Out-of-range targets clamp, NaN goes to 0.
    pub fn resolve(self, len: usize) -> f64 {
        let n = len as f64;
        let target = match self {
            Seek::Fraction(f) => f * n,
            Seek::Frames(p) => p,
        };
        if !(target >= 0.0) {
            0.0
        } else if target >= n {
            (n - 1.0).max(0.0)
        } else {
            target
        }
    }
}

/// Live controls shared between controllers and the audio thread.
#[derive(Debug)]
pub struct ParamSurface {
    volume: AtomicF32,
    pitch: AtomicF32,
    speed: AtomicF32,
    cutoff: AtomicF32,
    echo_mix: AtomicF32,
    distortion: AtomicF32,
    pan: AtomicF32,
    reverse: AtomicBool,
    playing: AtomicBool,
}

impl ParamSurface {
    pub fn new() -> Self {
        Self::from_snapshot(&ControlSnapshot::default())
    }

    pub fn from_snapshot(values: &ControlSnapshot) -> Self {
        Self {
            volume: AtomicF32::new(values.volume),
            pitch: AtomicF32::new(values.pitch),
            speed: AtomicF32::new(values.speed),
            cutoff: AtomicF32::new(values.cutoff),
            echo_mix: AtomicF32::new(values.echo_mix),
            distortion: AtomicF32::new(values.distortion),
            pan: AtomicF32::new(values.pan),
            reverse: AtomicBool::new(values.reverse),
            playing: AtomicBool::new(values.playing),
        }
    }

    /// Read every control exactly once and clamp. Call once per block.
    pub fn snapshot(&self) -> ControlSnapshot {
        ControlSnapshot {
            volume: self.volume.load(),
            pitch: self.pitch.load(),
            speed: self.speed.load(),
            cutoff: self.cutoff.load(),
            echo_mix: self.echo_mix.load(),
            distortion: self.distortion.load(),
            pan: self.pan.load(),
            reverse: self.reverse.load(Ordering::Relaxed),
            playing: self.playing.load(Ordering::Relaxed),
        }
        .clamped()
    }

    /// Return every control except `playing` to its default.
    pub fn reset_defaults(&self) {
        let d = ControlSnapshot::default();
        self.volume.store(d.volume);
        self.pitch.store(d.pitch);
        self.speed.store(d.speed);
        self.cutoff.store(d.cutoff);
        self.echo_mix.store(d.echo_mix);
        self.distortion.store(d.distortion);
        self.pan.store(d.pan);
        self.reverse.store(d.reverse, Ordering::Relaxed);
    }

    pub fn volume(&self) -> f32 {
        self.volume.load()
    }

    pub fn set_volume(&self, value: f32) {
        self.volume.store(value);
    }

    pub fn pitch(&self) -> f32 {
        self.pitch.load()
    }

    pub fn set_pitch(&self, value: f32) {
        self.pitch.store(value);
    }

    pub fn speed(&self) -> f32 {
        self.speed.load()
    }

    pub fn set_speed(&self, value: f32) {
        self.speed.store(value);
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff.load()
    }

    pub fn set_cutoff(&self, value: f32) {
        self.cutoff.store(value);
    }

    pub fn echo_mix(&self) -> f32 {
        self.echo_mix.load()
    }

    pub fn set_echo_mix(&self, value: f32) {
        self.echo_mix.store(value);
    }

    pub fn distortion(&self) -> f32 {
        self.distortion.load()
    }

    pub fn set_distortion(&self, value: f32) {
        self.distortion.store(value);
    }

    pub fn pan(&self) -> f32 {
        self.pan.load()
    }

    pub fn set_pan(&self, value: f32) {
        self.pan.store(value);
    }

    pub fn reverse(&self) -> bool {
        self.reverse.load(Ordering::Relaxed)
    }

    pub fn set_reverse(&self, value: bool) {
        self.reverse.store(value, Ordering::Relaxed);
    }

    pub fn playing(&self) -> bool {
        self.playing.load(Ordering::Relaxed)
    }

    pub fn set_playing(&self, value: bool) {
        self.playing.store(value, Ordering::Relaxed);
    }

    pub fn toggle_playing(&self) {
        self.playing.fetch_xor(true, Ordering::Relaxed);
    }
}

impl Default for ParamSurface {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_clamps_at_read_time() {
        let params = ParamSurface::new();
        params.set_pitch(10.0);
        params.set_speed(0.01);
        params.set_pan(-3.0);
        params.set_cutoff(2.0);

        // Writes are stored as-is
        assert!((params.pitch() - 10.0).abs() < 1e-6);

        let snap = params.snapshot();
        assert!((snap.pitch - 4.0).abs() < 1e-6);
        assert!((snap.speed - 0.25).abs() < 1e-6);
        assert!((snap.pan + 1.0).abs() < 1e-6);
        assert!((snap.cutoff - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_non_finite_falls_back_to_default() {
        let params = ParamSurface::new();
        params.set_volume(f32::NAN);
        params.set_echo_mix(f32::INFINITY);

        let snap = params.snapshot();
        assert!((snap.volume - 0.7).abs() < 1e-6);
        assert_eq!(snap.echo_mix, 0.0);
    }

    #[test]
    fn test_rate_combines_pitch_speed_and_direction() {
        let snap = ControlSnapshot {
            pitch: 2.0,
            speed: 1.5,
            reverse: true,
            ..ControlSnapshot::default()
        };
        assert!((snap.rate() + 3.0).abs() < 1e-9);

        let extreme = ControlSnapshot {
            pitch: 100.0,
            speed: 100.0,
            ..ControlSnapshot::default()
        };
        assert!((extreme.rate() - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_reset_keeps_playing_state() {
        let params = ParamSurface::new();
        params.set_playing(false);
        params.set_distortion(0.8);
        params.set_reverse(true);

        params.reset_defaults();

        assert!(!params.playing());
        assert!(!params.reverse());
        assert_eq!(params.distortion(), 0.0);
    }

    #[test]
    fn test_seek_resolve_clamps() {
        assert_eq!(Seek::Fraction(-0.5).resolve(100), 0.0);
        assert_eq!(Seek::Fraction(0.25).resolve(100), 25.0);
        assert_eq!(Seek::Frames(250.0).resolve(100), 99.0);
        assert_eq!(Seek::Frames(f64::NAN).resolve(100), 0.0);
    }

    #[test]
    fn test_toggle_playing() {
        let params = ParamSurface::new();
        assert!(params.playing());
        params.toggle_playing();
        assert!(!params.playing());
        params.toggle_playing();
        assert!(params.playing());
    }
}
