//! Error types for vaani-asr organized by processing stage.

use ndarray::ShapeError;
use ndarray_stats::errors::MinMaxError;
use thiserror::Error;

/// Message returned to callers for faults that are not caused by their input.
const INTERNAL_FAULT_MESSAGE: &str = "internal error while transcribing audio";

/// Transcription error variants organized by processing stage.
#[derive(Debug, Error)]
pub enum Error {
    /// Audio container rejected before decoding
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Sample data could not be decoded
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Feature extraction stage error
    #[error(transparent)]
    Features(#[from] FeatureError),

    /// Acoustic model stage error
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

impl Error {
    /// Whether the error is attributable to the submitted audio.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Error::Format(_) | Error::Decode(_))
    }

    /// Message safe to show to whoever submitted the audio.
    ///
    /// Input errors carry their specific reason; internal faults collapse to
    /// a generic message so no internal state leaks.
    pub fn user_message(&self) -> String {
        if self.is_user_error() {
            self.to_string()
        } else {
            INTERNAL_FAULT_MESSAGE.to_string()
        }
    }
}

/// Audio container validation errors.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Encoding other than uncompressed PCM or IEEE float
    #[error("unsupported audio encoding: expected uncompressed PCM")]
    UnsupportedCompression,

    /// Channel count validation failed
    #[error("audio is not mono: got {0} channels")]
    ChannelMismatch(u16),

    /// Sample rate validation failed
    #[error("invalid sample rate: expected {expected}Hz, got {got}Hz")]
    SampleRateMismatch { expected: u32, got: u32 },

    /// Header could not be parsed
    #[error("invalid audio file: {0}")]
    MalformedContainer(String),
}

/// Sample decoding errors.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Sample data ends before the declared length
    #[error("audio data is truncated: {0}")]
    Truncated(String),

    /// Sample data does not match the header
    #[error("audio data is inconsistent with its header: {0}")]
    Inconsistent(String),

    /// Peak of the waveform is undefined (NaN samples)
    #[error("audio contains non-numeric samples")]
    NonNumeric(#[from] MinMaxError),

    /// Peak of the waveform is infinite
    #[error("audio contains infinite samples")]
    Infinite,
}

/// Feature extraction errors.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// Zero-length waveform
    #[error("cannot extract features from an empty waveform")]
    EmptyWaveform,

    /// Waveform sample rate differs from the configured one
    #[error("feature extractor expects {expected}Hz audio, got {got}Hz")]
    SampleRate { expected: u32, got: u32 },

    /// NaN or infinity in the computed features
    #[error("non-finite value in features at mel bin {bin}, frame {frame}")]
    NonFinite { bin: usize, frame: usize },
}

/// Acoustic model errors (ONNX, output shape).
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Missing expected output tensor
    #[error("missing model output: {name}")]
    MissingOutput { name: String },

    /// Output tensor rank is neither 2 nor 3, or the batch axis is empty
    #[error("unexpected model output shape: {shape:?}")]
    UnexpectedShape { shape: Vec<usize> },

    /// ONNX Runtime error
    #[error(transparent)]
    Ort(#[from] ort::Error),

    /// ndarray shape error
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

/// Result type alias for vaani-asr operations.
pub type Result<T> = std::result::Result<T, Error>;

// Nested From implementations for automatic error conversion chains

// hound::Error → FormatError → Error
impl From<hound::Error> for FormatError {
    fn from(e: hound::Error) -> Self {
        match e {
            hound::Error::Unsupported => FormatError::UnsupportedCompression,
            e => FormatError::MalformedContainer(e.to_string()),
        }
    }
}

// hound::Error → DecodeError
impl From<hound::Error> for DecodeError {
    fn from(e: hound::Error) -> Self {
        match e {
            hound::Error::IoError(e) => DecodeError::Truncated(e.to_string()),
            hound::Error::UnfinishedSample => DecodeError::Truncated(e.to_string()),
            e => DecodeError::Inconsistent(e.to_string()),
        }
    }
}

// ort::Error → InferenceError → Error
impl From<ort::Error> for Error {
    fn from(e: ort::Error) -> Self {
        Error::Inference(InferenceError::Ort(e))
    }
}

// ShapeError → InferenceError → Error
impl From<ShapeError> for Error {
    fn from(e: ShapeError) -> Self {
        Error::Inference(InferenceError::Shape(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_keep_their_reason() {
        let e: Error = FormatError::SampleRateMismatch {
            expected: 16000,
            got: 44100,
        }
        .into();

        assert!(e.is_user_error());
        assert_eq!(
            e.user_message(),
            "invalid sample rate: expected 16000Hz, got 44100Hz"
        );
    }

    #[test]
    fn internal_faults_hide_details() {
        let e: Error = InferenceError::MissingOutput {
            name: "logprobs".to_string(),
        }
        .into();

        assert!(!e.is_user_error());
        assert_eq!(e.user_message(), INTERNAL_FAULT_MESSAGE);
        assert!(e.to_string().contains("logprobs"));
    }

    #[test]
    fn hound_unsupported_maps_to_compression() {
        let e = FormatError::from(hound::Error::Unsupported);
        assert!(matches!(e, FormatError::UnsupportedCompression));

        let e = FormatError::from(hound::Error::FormatError("no RIFF tag found"));
        assert!(matches!(e, FormatError::MalformedContainer(_)));
    }
}
