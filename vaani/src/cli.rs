//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use eyre::Result;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "vaani")]
#[command(about = "Hindi speech-to-text with Conformer-CTC models")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Transcribe a mono 16kHz WAV file and print {"text": ...}
    Transcribe(crate::transcribe::Args),

    /// Validate a WAV file and print its format without running a model
    Inspect(crate::inspect::Args),
}

/// Model artifact arguments shared by model-backed commands.
#[derive(clap::Args, Debug)]
pub struct ModelArgs {
    /// Path to the exported Conformer-CTC ONNX model
    #[arg(short, long)]
    pub model: PathBuf,

    /// Vocabulary file versioned with the model (default: built-in Hindi table)
    #[arg(long)]
    pub vocab: Option<PathBuf>,
}

/// Execute CLI command - separated for testing.
pub fn run_cli(cli: Cli) -> Result<()> {
    tracing::debug!(?cli, "parsed arguments");

    match cli.command {
        Commands::Transcribe(args) => crate::transcribe::execute(args.try_into()?),
        Commands::Inspect(args) => crate::inspect::execute(args.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_transcribe_command() {
        let cli = Cli::parse_from(["vaani", "transcribe", "audio.wav", "-m", "model.onnx"]);

        match &cli.command {
            Commands::Transcribe(crate::transcribe::Args {
                path,
                model_args: ModelArgs { model, vocab: None },
                words: false,
                dump_dir: None,
            }) if path.to_str() == Some("audio.wav") && model.to_str() == Some("model.onnx") => {}
            _ => panic!("unexpected command: {:?}", cli.command),
        }
    }

    #[test]
    fn parses_transcribe_with_options() {
        let cli = Cli::parse_from([
            "vaani",
            "transcribe",
            "audio.wav",
            "--model",
            "model.onnx",
            "--vocab",
            "vocab.txt",
            "--words",
            "--dump-dir",
            "/tmp/dumps",
        ]);

        match &cli.command {
            Commands::Transcribe(crate::transcribe::Args {
                model_args:
                    ModelArgs {
                        vocab: Some(vocab), ..
                    },
                words: true,
                dump_dir: Some(dump_dir),
                ..
            }) if vocab.to_str() == Some("vocab.txt") && dump_dir.to_str() == Some("/tmp/dumps") => {}
            _ => panic!("unexpected command: {:?}", cli.command),
        }
    }

    #[test]
    fn transcribe_requires_a_model() {
        let result = Cli::try_parse_from(["vaani", "transcribe", "audio.wav"]);
        assert!(result.is_err());
    }

    #[test]
    fn parses_inspect_command() {
        let cli = Cli::parse_from(["vaani", "inspect", "audio.wav"]);

        match &cli.command {
            Commands::Inspect(crate::inspect::Args { path }) if path.to_str() == Some("audio.wav") => {}
            _ => panic!("unexpected command: {:?}", cli.command),
        }
    }
}
