use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn a source file into a [`SampleBuffer`](crate::SampleBuffer).
///
/// Raised before any engine exists, so a caller never sees a half-built player.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported or unrecognised audio format: {0}")]
    Unsupported(String),
    #[error("no decodable audio track")]
    NoAudioTrack,
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("source contains no audio frames")]
    Empty,
}

/// Failure to open or start the audio output device. Never retried internally.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("no default output device available")]
    NoOutputDevice,
    #[error("output device has no stereo f32 configuration at {0} Hz")]
    NoSupportedConfig(u32),
    #[error("failed to query output configs: {0}")]
    QueryConfig(#[from] cpal::SupportedStreamConfigsError),
    #[error("failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),
    #[error("failed to start output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}
