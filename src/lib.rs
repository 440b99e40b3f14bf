pub mod config;
pub mod dsp; // Effect primitives for the playback chain
pub mod engine; // Block renderer and control commands
pub mod error;
pub mod io;
pub mod params; // Shared control surface
pub mod sample; // Decoded source audio

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{DeviceError, LoadError};
#[cfg(feature = "rtrb")]
pub use io::{PlaybackStatus, Player};
pub use params::{ControlSnapshot, ParamSurface, Seek};
pub use sample::SampleBuffer;

/// One stereo frame: `[left, right]`.
pub type Frame = [f32; 2];

pub const MAX_BLOCK_SIZE: usize = 2048;
pub const WORKING_SAMPLE_RATE: u32 = 44_100;
