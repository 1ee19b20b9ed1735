//! End-to-end transcription pipeline.

use crate::audio;
use crate::detokenizer::CtcGreedyDecoder;
use crate::error::Result;
use crate::preprocessor::FeatureExtractor;
use crate::traits::AcousticModel;
use crate::types::Transcript;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

/// Per-pipeline options.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TranscriberConfig {
    /// Keep a copy of each request's raw bytes in this directory while the
    /// request runs. The copy is deleted when the request finishes.
    pub dump_dir: Option<PathBuf>,
}

/// Audio bytes to transcript: validate, decode, extract, infer, decode.
///
/// All components are immutable after construction, so a `Transcriber` can be
/// shared by reference or `Arc` between threads when its model allows it.
pub struct Transcriber<M> {
    extractor: FeatureExtractor,
    model: M,
    decoder: CtcGreedyDecoder,
    config: TranscriberConfig,
    vocab_mismatch_reported: AtomicBool,
}

impl<M: AcousticModel> Transcriber<M> {
    pub fn new(extractor: FeatureExtractor, model: M, decoder: CtcGreedyDecoder) -> Self {
        Self {
            extractor,
            model,
            decoder,
            config: TranscriberConfig::default(),
            vocab_mismatch_reported: AtomicBool::new(false),
        }
    }

    pub fn with_config(mut self, config: TranscriberConfig) -> Self {
        self.config = config;
        self
    }

    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn decoder(&self) -> &CtcGreedyDecoder {
        &self.decoder
    }

    /// Transcribe one WAV file held in memory.
    ///
    /// Silence or unrecognizable speech yields an empty transcript, not an
    /// error.
    ///
    /// # Errors
    ///
    /// Input problems surface as [`crate::Error::Format`] or
    /// [`crate::Error::Decode`]; everything else is an internal fault (see
    /// [`crate::Error::is_user_error`]).
    pub fn transcribe(&self, bytes: &[u8]) -> Result<Transcript> {
        let _dump = self.dump(bytes);

        let descriptor = audio::validate(bytes)?;
        let waveform = audio::decode(bytes)?;

        tracing::debug!(
            samples = waveform.len(),
            duration_secs = waveform.duration_secs(descriptor.sample_rate),
            "audio decoded"
        );

        let features = self.extractor.extract(&waveform, descriptor.sample_rate)?;
        let output = self.model.infer(&features)?;

        self.check_vocab_size(output.vocab_size());

        let transcript = self.decoder.decode(&output);

        tracing::debug!(
            frames = output.num_frames(),
            chars = transcript.as_str().chars().count(),
            "transcription complete"
        );

        Ok(transcript)
    }

    /// Write the request bytes to a temporary file if a dump directory is set.
    ///
    /// Failures are logged and never fail the request.
    fn dump(&self, bytes: &[u8]) -> Option<tempfile::NamedTempFile> {
        let dir = self.config.dump_dir.as_ref()?;

        let result = tempfile::Builder::new()
            .prefix("request-")
            .suffix(".wav")
            .tempfile_in(dir)
            .and_then(|mut file| {
                file.write_all(bytes)?;
                file.flush()?;
                Ok(file)
            });

        match result {
            Ok(file) => {
                tracing::debug!(path = %file.path().display(), "request audio dumped");
                Some(file)
            }
            Err(e) => {
                tracing::warn!(error = %e, dir = %dir.display(), "failed to dump request audio");
                None
            }
        }
    }

    /// Warn once when the model's class count differs from the token table.
    fn check_vocab_size(&self, model_vocab: usize) {
        let table = self.decoder.vocabulary().len();

        if model_vocab != table && !self.vocab_mismatch_reported.swap(true, Ordering::Relaxed) {
            tracing::warn!(
                model_vocab,
                table,
                "model output size differs from vocabulary; unknown ids will be skipped"
            );
        }
    }
}
