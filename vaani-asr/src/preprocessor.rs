//! Log-mel feature extraction for Conformer-CTC models.
//!
//! The transform reproduces the front end the model was trained against:
//!
//! 1. Centered STFT power spectrum (periodic Hann window, zero padding)
//! 2. Slaney-scale mel filterbank with Slaney area normalization
//! 3. Log compression with a small additive guard
//! 4. Mean-variance normalization per mel bin
//!
//! Changing any constant in [`FeatureConfig::CONFORMER_CTC`] silently degrades
//! recognition with an existing model.

use crate::audio::SAMPLE_RATE;
use crate::error::{FeatureError, Result};
use crate::types::Waveform;
use ndarray::{Array2, Array3, Axis};
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::f64::consts::PI;
use std::sync::Arc;

/// Feature extraction parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureConfig {
    pub sample_rate: u32,
    pub n_mels: usize,
    pub n_fft: usize,
    pub win_length: usize,
    pub hop_length: usize,
    pub f_min: f32,
    pub f_max: f32,
    /// Added to mel power before `ln`
    pub log_guard: f32,
    /// Added to each row's standard deviation before dividing
    pub std_guard: f32,
}

impl FeatureConfig {
    /// Hindi Conformer-CTC front end (80 mel features).
    pub const CONFORMER_CTC: Self = Self {
        sample_rate: SAMPLE_RATE,
        n_mels: 80,
        n_fft: 512,
        win_length: 400,
        hop_length: 160,
        f_min: 0.0,
        f_max: 8000.0,
        log_guard: 1e-6,
        std_guard: 1e-9,
    };

    /// Number of STFT frames produced for `num_samples` input samples.
    ///
    /// The signal is centered by `n_fft / 2` zeros on each side, so every
    /// non-empty input yields at least one frame.
    pub fn num_frames(&self, num_samples: usize) -> usize {
        if num_samples == 0 {
            0
        } else {
            1 + num_samples / self.hop_length
        }
    }

    /// Number of non-negative frequency bins of the FFT.
    pub fn freq_bins(&self) -> usize {
        self.n_fft / 2 + 1
    }
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self::CONFORMER_CTC
    }
}

/// Normalized log-mel features with a leading batch axis: `(1, n_mels, frames)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Features {
    tensor: Array3<f32>,
}

impl Features {
    pub fn new(tensor: Array3<f32>) -> Self {
        Self { tensor }
    }

    pub fn tensor(&self) -> &Array3<f32> {
        &self.tensor
    }

    pub fn n_mels(&self) -> usize {
        self.tensor.shape()[1]
    }

    /// Number of time frames, passed to the model as its `length` input.
    pub fn frame_length(&self) -> usize {
        self.tensor.shape()[2]
    }
}

/// Log-mel feature extractor.
///
/// Holds the precomputed window, filterbank and FFT plan; extraction itself
/// is a pure function of the waveform, so one extractor can serve many
/// threads.
#[derive(Clone)]
pub struct FeatureExtractor {
    config: FeatureConfig,
    window: Vec<f32>,
    filterbank: Array2<f32>,
    fft: Arc<dyn Fft<f32>>,
}

impl std::fmt::Debug for FeatureExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureExtractor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl FeatureExtractor {
    pub fn new(config: FeatureConfig) -> Self {
        let window = padded_hann_window(config.win_length, config.n_fft);
        let filterbank = slaney_mel_filterbank(&config);
        let fft = FftPlanner::<f32>::new().plan_fft_forward(config.n_fft);

        Self {
            config,
            window,
            filterbank,
            fft,
        }
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Mel filterbank of shape `(n_mels, freq_bins)`.
    pub fn filterbank(&self) -> &Array2<f32> {
        &self.filterbank
    }

    /// Extract normalized features from a waveform.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError`] if the waveform is empty, was recorded at a
    /// different sample rate, or the result contains non-finite values.
    pub fn extract(&self, waveform: &Waveform, sample_rate: u32) -> Result<Features> {
        if sample_rate != self.config.sample_rate {
            return Err(FeatureError::SampleRate {
                expected: self.config.sample_rate,
                got: sample_rate,
            }
            .into());
        }

        if waveform.is_empty() {
            return Err(FeatureError::EmptyWaveform.into());
        }

        let mel = self.mel_spectrogram(waveform.samples());
        let features = self.normalize(mel);

        if let Some(((bin, frame), _)) = features.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(FeatureError::NonFinite { bin, frame }.into());
        }

        tracing::debug!(
            samples = waveform.len(),
            frames = features.ncols(),
            "features extracted"
        );

        Ok(Features::new(features.insert_axis(Axis(0))))
    }

    /// Mel power spectrogram of shape `(n_mels, frames)`.
    pub fn mel_spectrogram(&self, samples: &[f32]) -> Array2<f32> {
        let spectrogram = self.power_spectrogram(samples);
        self.filterbank.dot(&spectrogram)
    }

    /// Centered STFT power spectrogram of shape `(freq_bins, frames)`.
    fn power_spectrogram(&self, samples: &[f32]) -> Array2<f32> {
        let n_fft = self.config.n_fft;
        let hop_length = self.config.hop_length;
        let pad = n_fft / 2;

        let num_frames = self.config.num_frames(samples.len());
        let mut spectrogram = Array2::<f32>::zeros((self.config.freq_bins(), num_frames));
        let mut frame = vec![Complex::new(0.0, 0.0); n_fft];

        for (frame_idx, mut column) in spectrogram.axis_iter_mut(Axis(1)).enumerate() {
            // Index into the zero-padded signal
            let start = frame_idx * hop_length;

            for (i, (bin, &w)) in frame.iter_mut().zip(&self.window).enumerate() {
                let sample = (start + i)
                    .checked_sub(pad)
                    .and_then(|j| samples.get(j))
                    .copied()
                    .unwrap_or(0.0);
                *bin = Complex::new(sample * w, 0.0);
            }

            self.fft.process(&mut frame);

            for (power, c) in column.iter_mut().zip(&frame) {
                *power = c.norm_sqr();
            }
        }

        spectrogram
    }

    /// Log-compress and standardize each mel bin across time.
    fn normalize(&self, mel: Array2<f32>) -> Array2<f32> {
        let log_guard = self.config.log_guard;
        let std_guard = self.config.std_guard as f64;

        let mut features = mel.mapv(|p| (p + log_guard).ln());

        // Accumulate in f64 so constant rows normalize to exactly zero
        for mut row in features.axis_iter_mut(Axis(0)) {
            let n = row.len() as f64;
            let mean = row.iter().map(|&x| x as f64).sum::<f64>() / n;
            let variance = row.iter().map(|&x| (x as f64 - mean).powi(2)).sum::<f64>() / n;
            let std = variance.sqrt() + std_guard;

            row.mapv_inplace(|x| ((x as f64 - mean) / std) as f32);
        }

        features
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new(FeatureConfig::CONFORMER_CTC)
    }
}

/// Periodic Hann window of `win_length` samples, centered in `n_fft` zeros.
fn padded_hann_window(win_length: usize, n_fft: usize) -> Vec<f32> {
    let offset = (n_fft - win_length) / 2;
    let mut window = vec![0.0f32; n_fft];

    for (i, w) in window[offset..offset + win_length].iter_mut().enumerate() {
        *w = (0.5 - 0.5 * (2.0 * PI * i as f64 / win_length as f64).cos()) as f32;
    }

    window
}

const SLANEY_F_SP: f64 = 200.0 / 3.0;
const SLANEY_MIN_LOG_HZ: f64 = 1000.0;
const SLANEY_MIN_LOG_MEL: f64 = SLANEY_MIN_LOG_HZ / SLANEY_F_SP;

fn slaney_log_step() -> f64 {
    6.4f64.ln() / 27.0
}

/// Convert frequency in Hz to the Slaney mel scale (linear below 1kHz).
fn hz_to_mel(freq: f64) -> f64 {
    if freq >= SLANEY_MIN_LOG_HZ {
        SLANEY_MIN_LOG_MEL + (freq / SLANEY_MIN_LOG_HZ).ln() / slaney_log_step()
    } else {
        freq / SLANEY_F_SP
    }
}

/// Convert Slaney mel back to frequency in Hz.
fn mel_to_hz(mel: f64) -> f64 {
    if mel >= SLANEY_MIN_LOG_MEL {
        SLANEY_MIN_LOG_HZ * (slaney_log_step() * (mel - SLANEY_MIN_LOG_MEL)).exp()
    } else {
        SLANEY_F_SP * mel
    }
}

/// Create a Slaney-normalized triangular mel filterbank `(n_mels, freq_bins)`.
fn slaney_mel_filterbank(config: &FeatureConfig) -> Array2<f32> {
    let n_mels = config.n_mels;
    let freq_bins = config.freq_bins();
    let bin_width = config.sample_rate as f64 / config.n_fft as f64;

    let min_mel = hz_to_mel(config.f_min as f64);
    let max_mel = hz_to_mel(config.f_max as f64);

    let mel_points: Vec<f64> = (0..n_mels + 2)
        .map(|i| mel_to_hz(min_mel + (max_mel - min_mel) * i as f64 / (n_mels + 1) as f64))
        .collect();

    let mut filterbank = Array2::<f32>::zeros((n_mels, freq_bins));

    for (mel_idx, mut filter) in filterbank.axis_iter_mut(Axis(0)).enumerate() {
        let left = mel_points[mel_idx];
        let center = mel_points[mel_idx + 1];
        let right = mel_points[mel_idx + 2];
        let enorm = 2.0 / (right - left);

        for (freq_idx, weight) in filter.iter_mut().enumerate() {
            let freq = freq_idx as f64 * bin_width;
            let lower = (freq - left) / (center - left);
            let upper = (right - freq) / (right - center);
            *weight = (lower.min(upper).max(0.0) * enorm) as f32;
        }
    }

    filterbank
}
