//! Effect primitives for the playback chain.
//!
//! These components are allocation-free and realtime-safe once constructed.
//! They work on whole stereo blocks and own only the state their effect needs,
//! leaving parameter snapshots and ordering to [`Engine`](crate::Engine).

/// Soft-clip waveshaper.
pub mod distortion;
/// Dual-tap feedback echo over a circular history.
pub mod echo;
/// Butterworth low-pass cascade with adaptive redesign and bypass.
pub mod filter;
/// Pan gains, volume and the output clamp.
pub mod pan;
/// Fractional playhead and linear-interpolation reader.
pub mod resample;

pub use echo::EchoNetwork;
pub use filter::AdaptiveLowPass;
pub use resample::Transport;
