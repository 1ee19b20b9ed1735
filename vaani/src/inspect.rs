//! Inspect subcommand - describe a WAV file without loading a model.

use eyre::{Result, WrapErr};
use serde::Serialize;
use std::path::{Path, PathBuf};
use vaani_asr::{Compression, FeatureConfig, audio};

/// CLI arguments for inspection.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// Path to input WAV file
    pub path: PathBuf,
}

/// Resolved configuration for inspection.
#[derive(Debug)]
pub struct Config {
    pub path: PathBuf,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self { path: args.path }
    }
}

/// What the pipeline would see for a file.
#[derive(Debug, Serialize, PartialEq)]
pub struct Report {
    pub compression: &'static str,
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub samples: usize,
    pub duration_secs: f32,
    /// Feature frames passed to the model as its `length` input
    pub frames: usize,
}

pub fn execute(config: Config) -> Result<()> {
    let report = describe(&config.path)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Validate and decode a WAV file, reporting its format and frame count.
pub fn describe(path: &Path) -> Result<Report> {
    let bytes =
        std::fs::read(path).wrap_err_with(|| format!("failed to read audio: {:?}", path.display()))?;

    let descriptor = audio::validate(&bytes).wrap_err("invalid audio")?;
    let waveform = audio::decode(&bytes).wrap_err("invalid audio")?;

    let compression = match descriptor.compression {
        Compression::Pcm => "pcm",
        Compression::Float => "float",
    };

    Ok(Report {
        compression,
        channels: descriptor.channels,
        sample_rate: descriptor.sample_rate,
        bits_per_sample: descriptor.bits_per_sample,
        samples: waveform.len(),
        duration_secs: waveform.duration_secs(descriptor.sample_rate),
        frames: FeatureConfig::CONFORMER_CTC.num_frames(waveform.len()),
    })
}
