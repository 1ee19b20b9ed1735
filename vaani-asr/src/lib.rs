//! vaani-asr: Hindi speech-to-text core for Conformer-CTC models.
//!
//! Turns the bytes of a mono 16kHz WAV file into text in five stages:
//!
//! - [`audio::validate`]: checks the container's encoding, channels and rate
//! - [`audio::decode`]: reads samples and peak-normalizes them
//! - [`preprocessor::FeatureExtractor`]: computes normalized log-mel features
//! - [`traits::AcousticModel`]: runs the model, e.g. [`models::OnnxModel`]
//! - [`detokenizer::CtcGreedyDecoder`]: collapses per-frame argmax ids to text
//!
//! [`pipelines::Transcriber`] wires the stages together.
//!
//! # Quick Start
//!
//! ```ignore
//! use vaani_asr::models::{OnnxConfig, OnnxModel};
//! use vaani_asr::{CtcGreedyDecoder, FeatureExtractor, Transcriber, Vocabulary};
//! use ort::session::Session;
//!
//! let model = OnnxModel::from_file("model.onnx", Session::builder()?, OnnxConfig::default())?;
//! let transcriber = Transcriber::new(
//!     FeatureExtractor::default(),
//!     model,
//!     CtcGreedyDecoder::new(Vocabulary::hindi()),
//! );
//!
//! let transcript = transcriber.transcribe(&std::fs::read("audio.wav")?)?;
//! println!("{}", transcript.to_words());
//! ```

pub mod audio;
pub mod detokenizer;
pub mod error;
pub mod models;
pub mod pipelines;
pub mod preprocessor;
pub mod traits;
pub mod types;
pub mod vocab;

pub use detokenizer::CtcGreedyDecoder;
pub use error::{Error, Result};
pub use pipelines::{Transcriber, TranscriberConfig};
pub use preprocessor::{FeatureConfig, FeatureExtractor, Features};
pub use traits::AcousticModel;
pub use types::{AudioFormatDescriptor, Compression, ModelOutput, Transcript, Waveform};
pub use vocab::Vocabulary;
