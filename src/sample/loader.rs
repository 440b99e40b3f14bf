//! Decode audio files into a [`SampleBuffer`] at the working sample rate.
//!
//! Any container/codec symphonia was built with is accepted. The result is
//! always stereo: mono is duplicated, extra channels are dropped. Sources at
//! other rates are linearly resampled once here so the engine never has to.

use std::{fs::File, path::Path};

use symphonia::core::{
    audio::{SampleBuffer as DecodeBuffer, SignalSpec},
    codecs::{DecoderOptions, CODEC_TYPE_NULL},
    errors::Error,
    formats::FormatOptions,
    io::{MediaSource, MediaSourceStream},
    meta::MetadataOptions,
    probe::Hint,
};
use tracing::{debug, info, warn};

use crate::{sample::SampleBuffer, Frame, LoadError};

/// Load and decode `path`, resampling to `target_rate`.
pub fn load_file(path: impl AsRef<Path>, target_rate: u32) -> Result<SampleBuffer, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let label = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    decode(Box::new(file), hint, label, target_rate)
}

/// Decode any symphonia media source.
pub fn decode(
    source: Box<dyn MediaSource>,
    hint: Hint,
    label: String,
    target_rate: u32,
) -> Result<SampleBuffer, LoadError> {
    let mss = MediaSourceStream::new(source, Default::default());

    let meta_opts: MetadataOptions = Default::default();
    let fmt_opts: FormatOptions = Default::default();

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &fmt_opts, &meta_opts)
        .map_err(|e| match e {
            Error::Unsupported(what) => LoadError::Unsupported(what.to_string()),
            other => LoadError::Decode(other.to_string()),
        })?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(LoadError::NoAudioTrack)?;
    let track_id = track.id;
    let mut source_rate = track.codec_params.sample_rate.unwrap_or(target_rate);

    let dec_opts: DecoderOptions = Default::default();
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &dec_opts)
        .map_err(|e| match e {
            Error::Unsupported(what) => LoadError::Unsupported(what.to_string()),
            other => LoadError::Decode(other.to_string()),
        })?;

    let mut frames: Vec<Frame> = Vec::new();
    let mut scratch: Option<(DecodeBuffer<f32>, SignalSpec)> = None;
    let mut skipped_packets = 0usize;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            // End of stream is reported as an IO error.
            Err(Error::IoError(_)) => break,
            // Chained streams; treat as the end.
            Err(Error::ResetRequired) => break,
            Err(err) => return Err(LoadError::Decode(err.to_string())),
        };

        while !format.metadata().is_latest() {
            format.metadata().pop();
        }

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(Error::DecodeError(_)) => {
                // Corrupt packet: skip it and keep going.
                skipped_packets += 1;
                continue;
            }
            Err(err) => return Err(LoadError::Decode(err.to_string())),
        };

        let spec = *decoded.spec();
        source_rate = spec.rate;
        let channels = spec.channels.count();
        if channels == 0 {
            continue;
        }

        // Reuse the interleave buffer unless the packet outgrew it or the layout changed.
        let needed = decoded.capacity();
        let stale = match &scratch {
            Some((buf, buf_spec)) => buf.capacity() < needed * channels || *buf_spec != spec,
            None => true,
        };
        if stale {
            scratch = Some((DecodeBuffer::<f32>::new(needed as u64, spec), spec));
        }
        let Some((buf, _)) = scratch.as_mut() else {
            continue;
        };
        buf.copy_interleaved_ref(decoded);

        frames.extend(buf.samples().chunks_exact(channels).map(|s| {
            if channels == 1 {
                [s[0], s[0]]
            } else {
                [s[0], s[1]]
            }
        }));
    }

    if skipped_packets > 0 {
        warn!(skipped_packets, "skipped undecodable packets");
    }
    if frames.is_empty() {
        return Err(LoadError::Empty);
    }

    debug!(frames = frames.len(), source_rate, "decoded source");

    let frames = if source_rate != target_rate && source_rate > 0 {
        info!(from = source_rate, to = target_rate, "resampling source");
        resample_linear(&frames, source_rate, target_rate)
    } else {
        frames
    };

    SampleBuffer::new(frames, target_rate, label)
}

/// Linear-interpolation resampler from `from` Hz to `to` Hz.
pub fn resample_linear(frames: &[Frame], from: u32, to: u32) -> Vec<Frame> {
    if frames.is_empty() || from == to || from == 0 || to == 0 {
        return frames.to_vec();
    }

    let step = from as f64 / to as f64;
    let out_len = ((frames.len() as f64 / step).round() as usize).max(1);
    let last = frames.len() - 1;

    (0..out_len)
        .map(|i| {
            let t = i as f64 * step;
            let i0 = (t.floor() as usize).min(last);
            let i1 = (i0 + 1).min(last);
            let frac = (t - t.floor()) as f32;
            let (a, b) = (frames[i0], frames[i1]);
            [a[0] + (b[0] - a[0]) * frac, a[1] + (b[1] - a[1]) * frac]
        })
        .collect()
}
