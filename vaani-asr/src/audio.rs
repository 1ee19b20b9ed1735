//! Audio validation and waveform decoding.

use crate::error::{DecodeError, FormatError, Result};
use crate::types::{AudioFormatDescriptor, Compression, Waveform};
use hound::{SampleFormat, WavReader};
use ndarray::ArrayView1;
use ndarray_stats::QuantileExt;
use std::io::Cursor;

/// Expected sample rate for the acoustic model (16kHz)
pub const SAMPLE_RATE: u32 = 16000;

/// Open a WAV container held in memory, reading only its header.
fn open(bytes: &[u8]) -> std::result::Result<WavReader<Cursor<&[u8]>>, FormatError> {
    WavReader::new(Cursor::new(bytes)).map_err(|e| {
        let e = FormatError::from(e);
        tracing::warn!(error = %e, "rejecting audio container");
        e
    })
}

/// Inspect the container header and enforce the encoding contract.
///
/// Checks run in order: encoding, channel count, sample rate. No samples are
/// decoded.
///
/// # Errors
///
/// Returns [`FormatError`] wrapped in [`crate::error::Error::Format`] when:
/// - the header cannot be parsed
/// - the encoding is not uncompressed PCM or IEEE float
/// - the audio is not mono
/// - the sample rate is not 16kHz
pub fn validate(bytes: &[u8]) -> Result<AudioFormatDescriptor> {
    let reader = open(bytes)?;
    let descriptor = AudioFormatDescriptor::from(reader.spec());

    if descriptor.channels != 1 {
        return Err(FormatError::ChannelMismatch(descriptor.channels).into());
    }

    if descriptor.sample_rate != SAMPLE_RATE {
        tracing::error!(
            got = descriptor.sample_rate,
            expected = SAMPLE_RATE,
            "unexpected sample rate"
        );
        return Err(FormatError::SampleRateMismatch {
            expected: SAMPLE_RATE,
            got: descriptor.sample_rate,
        }
        .into());
    }

    tracing::debug!(?descriptor, frames = reader.duration(), "audio validated");

    Ok(descriptor)
}

/// Decode every sample of a WAV container to a peak-normalized waveform.
///
/// Integer samples are scaled by `2^(bits - 1)`, float samples are kept as-is.
///
/// # Errors
///
/// Returns [`DecodeError`] if the sample data is truncated or inconsistent
/// with the header, and [`FormatError`] if the header itself is unreadable.
pub fn decode(bytes: &[u8]) -> Result<Waveform> {
    let mut reader = open(bytes)?;
    let spec = reader.spec();
    let declared = reader.len() as usize;

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<hound::Result<_>>()
            .map_err(DecodeError::from)?,
        SampleFormat::Int => {
            let scale = (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 / scale))
                .collect::<hound::Result<_>>()
                .map_err(DecodeError::from)?
        }
    };

    if samples.len() != declared {
        return Err(DecodeError::Inconsistent(format!(
            "header declares {declared} samples, found {}",
            samples.len()
        ))
        .into());
    }

    peak_normalize(samples)
}

/// Divide every sample by the peak absolute value.
///
/// Silent (or empty) input is returned unscaled so no division by zero occurs.
/// NaN or infinite samples are rejected as undecodable.
pub fn peak_normalize(mut samples: Vec<f32>) -> Result<Waveform> {
    let peak = match ArrayView1::from(samples.as_slice()).mapv(f32::abs).max() {
        Ok(&peak) => peak,
        Err(ndarray_stats::errors::MinMaxError::EmptyInput) => 0.0,
        Err(e) => return Err(DecodeError::from(e).into()),
    };

    if peak.is_infinite() {
        return Err(DecodeError::Infinite.into());
    }

    if peak > 0.0 {
        samples.iter_mut().for_each(|s| *s /= peak);
    }

    Ok(Waveform::new(samples))
}

impl From<hound::WavSpec> for AudioFormatDescriptor {
    fn from(spec: hound::WavSpec) -> Self {
        let compression = match spec.sample_format {
            SampleFormat::Int => Compression::Pcm,
            SampleFormat::Float => Compression::Float,
        };

        Self {
            compression,
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
        }
    }
}
