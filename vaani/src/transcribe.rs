//! Transcribe subcommand - print the transcript of a WAV file as JSON.

use crate::cli::ModelArgs;
use crate::config::ModelConfig;
use eyre::{Result, WrapErr};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use vaani_asr::{
    AcousticModel, CtcGreedyDecoder, FeatureExtractor, Transcriber, TranscriberConfig,
};

/// CLI arguments for transcription.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// Path to input WAV file (mono, 16kHz)
    pub path: PathBuf,

    #[command(flatten)]
    pub model_args: ModelArgs,

    /// Render word boundaries as spaces instead of raw subword tokens
    #[arg(long)]
    pub words: bool,

    /// Keep a temporary copy of the input in this directory while transcribing
    #[arg(long)]
    pub dump_dir: Option<PathBuf>,
}

/// Resolved configuration for transcription.
#[derive(Debug)]
pub struct Config {
    pub path: PathBuf,
    pub model_config: ModelConfig,
    pub words: bool,
    pub transcriber_config: TranscriberConfig,
}

impl TryFrom<Args> for Config {
    type Error = eyre::Error;

    fn try_from(args: Args) -> Result<Self> {
        if let Some(dir) = &args.dump_dir
            && !dir.is_dir()
        {
            eyre::bail!("dump directory does not exist: {}", dir.display());
        }

        Ok(Self {
            path: args.path,
            model_config: args.model_args.try_into()?,
            words: args.words,
            transcriber_config: TranscriberConfig {
                dump_dir: args.dump_dir,
            },
        })
    }
}

/// JSON body printed on success.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Response {
    /// Transcript; empty when nothing was recognized, never null
    pub text: String,
}

pub fn execute(config: Config) -> Result<()> {
    let s = Instant::now();

    let model = config.model_config.load_model()?;

    let d = s.elapsed();
    tracing::info!(duration = %format_secs(d.as_secs_f32()), "model loaded");

    let transcriber = Transcriber::new(
        FeatureExtractor::default(),
        model,
        CtcGreedyDecoder::new(config.model_config.vocabulary),
    )
    .with_config(config.transcriber_config);

    let s = Instant::now();

    let response = transcribe_file(&transcriber, &config.path, config.words)?;

    let d = s.elapsed();
    tracing::info!(duration = %format_secs(d.as_secs_f32()), "inference completed");

    println!("{}", serde_json::to_string(&response)?);

    Ok(())
}

/// Read a WAV file and transcribe it with an already built pipeline.
pub fn transcribe_file<M: AcousticModel>(
    transcriber: &Transcriber<M>,
    path: &Path,
    words: bool,
) -> Result<Response> {
    tracing::info!(input = ?path.display(), "transcribing");

    let bytes =
        std::fs::read(path).wrap_err_with(|| format!("failed to read audio: {:?}", path.display()))?;

    let transcript = transcriber
        .transcribe(&bytes)
        .wrap_err("transcription failed")?;

    let text = if words {
        transcript.to_words()
    } else {
        transcript.into_string()
    };

    Ok(Response { text })
}

/// Format seconds as a string with two decimal places.
fn format_secs(secs: f32) -> String {
    format!("{:.2}s", secs)
}
