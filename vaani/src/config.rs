//! Configuration types for resolved CLI arguments.
//!
//! Args structs (for CLI parsing) live next to their subcommands; this module
//! holds the shared model configuration and its TryFrom implementation.

use crate::cli::ModelArgs;
use eyre::{Result, WrapErr};
#[allow(unused_imports)]
use ort::execution_providers::*;
use ort::session::Session;
use std::path::PathBuf;
use vaani_asr::Vocabulary;
use vaani_asr::models::{OnnxConfig, OnnxModel};

/// Resolved model configuration.
///
/// Converted from ModelArgs via TryFrom; the vocabulary is loaded eagerly so
/// a bad table fails before the model session is built.
#[derive(Debug)]
pub struct ModelConfig {
    pub model: PathBuf,
    pub vocabulary: Vocabulary,
}

impl TryFrom<ModelArgs> for ModelConfig {
    type Error = eyre::Error;

    fn try_from(args: ModelArgs) -> Result<Self> {
        let vocabulary = match args.vocab {
            Some(path) => Vocabulary::from_file(path)?,
            None => Vocabulary::hindi(),
        };

        Ok(Self {
            model: args.model,
            vocabulary,
        })
    }
}

impl ModelConfig {
    /// Load the acoustic model with execution providers configured by Cargo features.
    ///
    /// Configures ONNX Runtime session with execution providers in priority order. The first
    /// available provider is used; CPU is always available as fallback.
    ///
    /// # Execution Providers
    ///
    /// Enabled via Cargo features:
    /// - `cuda` - NVIDIA CUDA
    /// - `tensorrt` - NVIDIA TensorRT
    /// - `openvino` - Intel OpenVINO
    /// - `directml` - DirectML (Windows)
    /// - `coreml` - CoreML (macOS)
    pub fn load_model(&self) -> Result<OnnxModel> {
        tracing::info!(path = ?self.model.display(), "loading model");

        let builder = Session::builder()
            .and_then(|builder| {
                builder.with_execution_providers([
                    #[cfg(feature = "cuda")]
                    CUDAExecutionProvider::default().build(),
                    #[cfg(feature = "tensorrt")]
                    TensorRTExecutionProvider::default().build(),
                    #[cfg(feature = "openvino")]
                    OpenVINOExecutionProvider::default()
                        .with_device_type("HETERO:GPU,CPU")
                        .with_cache_dir(".cache/ort")
                        .build(),
                    #[cfg(feature = "directml")]
                    DirectMLExecutionProvider::default().build(),
                    #[cfg(feature = "coreml")]
                    CoreMLExecutionProvider::default().build(),
                ])
            })
            .wrap_err("failed to configure onnx runtime")?;

        OnnxModel::from_file(&self.model, builder, OnnxConfig::default())
    }
}
