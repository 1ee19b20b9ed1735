//! Conformer-CTC acoustic model running on ONNX Runtime.

use crate::error::{InferenceError, Result};
use crate::preprocessor::Features;
use crate::traits::AcousticModel;
use crate::types::ModelOutput;
use eyre::{OptionExt, Result as EyreResult, WrapErr};
use ndarray::Array1;
use ort::inputs;
use ort::session::Session;
use ort::session::builder::SessionBuilder;
use ort::value::Value;
use parking_lot::Mutex;
use std::path::Path;

/// Graph input names of an exported Conformer-CTC model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OnnxConfig {
    /// Log-mel features, f32 `(1, n_mels, frames)`
    pub signal_input: String,
    /// Frame count, i64 `(1,)`
    pub length_input: String,
}

impl Default for OnnxConfig {
    fn default() -> Self {
        Self {
            signal_input: "audio_signal".to_string(),
            length_input: "length".to_string(),
        }
    }
}

/// Acoustic model backed by a single ONNX session.
///
/// `Session::run` needs exclusive access, so concurrent calls to
/// [`AcousticModel::infer`] are serialized on an internal lock.
pub struct OnnxModel {
    session: Mutex<Session>,
    output_name: String,
    config: OnnxConfig,
}

impl OnnxModel {
    /// Wrap a loaded session; scores are read from its first output.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::MissingOutput`] if the graph declares no
    /// outputs.
    pub fn new(session: Session, config: OnnxConfig) -> Result<Self> {
        let output_name = session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .ok_or_else(|| InferenceError::MissingOutput {
                name: "<first output>".to_string(),
            })?;

        Ok(Self {
            session: Mutex::new(session),
            output_name,
            config,
        })
    }

    /// Load a model file with the given session builder.
    ///
    /// # Arguments
    ///
    /// * `path` - Exported `.onnx` model
    /// * `session_builder` - ONNX session builder for configuring execution providers
    pub fn from_file(
        path: impl AsRef<Path>,
        session_builder: SessionBuilder,
        config: OnnxConfig,
    ) -> EyreResult<Self> {
        let path = path.as_ref();
        ensure_model_file(path)?;

        let session = session_builder
            .commit_from_file(path)
            .wrap_err_with(|| format!("failed to load model session: {}", path.display()))?;

        let model = Self::new(session, config).wrap_err("model graph has no outputs")?;

        tracing::info!(
            path = %path.display(),
            output = %model.output_name,
            "acoustic model loaded"
        );

        Ok(model)
    }

    pub fn config(&self) -> &OnnxConfig {
        &self.config
    }

    /// Name of the output read as per-frame scores.
    pub fn output_name(&self) -> &str {
        &self.output_name
    }
}

impl AcousticModel for OnnxModel {
    fn infer(&self, features: &Features) -> Result<ModelOutput> {
        let length = Array1::from_elem((1,), features.frame_length() as i64);

        let audio_signal = Value::from_array(features.tensor().clone())?;
        let length = Value::from_array(length)?;

        let scores = {
            let mut session = self.session.lock();

            let mut outputs = session.run(inputs!(
                self.config.signal_input.as_str() => audio_signal,
                self.config.length_input.as_str() => length,
            ))?;

            let scores = outputs
                .remove(self.output_name.as_str())
                .ok_or_else(|| InferenceError::MissingOutput {
                    name: self.output_name.clone(),
                })?;

            scores.try_extract_array::<f32>()?.to_owned()
        };

        tracing::debug!(shape = ?scores.shape(), "model inference complete");

        ModelOutput::from_dyn(scores)
    }
}

/// Fail early with a readable message when the model file is absent.
fn ensure_model_file(path: &Path) -> EyreResult<()> {
    path.is_file()
        .then_some(())
        .ok_or_eyre(format!("model file not found: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_input_names_match_exported_graph() {
        let config = OnnxConfig::default();

        assert_eq!(config.signal_input, "audio_signal");
        assert_eq!(config.length_input, "length");
    }

    #[test]
    fn missing_model_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.onnx");

        let err = ensure_model_file(&path).unwrap_err();

        assert!(err.to_string().contains("model file not found"));
    }

    #[test]
    fn loading_a_non_model_file_fails_with_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.onnx");
        std::fs::write(&path, b"not an onnx graph").unwrap();

        let builder = Session::builder().unwrap();
        let err = OnnxModel::from_file(&path, builder, OnnxConfig::default())
            .err()
            .unwrap();

        assert!(err.to_string().contains("failed to load model session"));
    }
}
