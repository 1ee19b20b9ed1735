//! Core types for vaani-asr

use crate::error::{InferenceError, Result};
use crate::vocab::{BLANK_ID, WORD_BOUNDARY};
use ndarray::{Array2, ArrayD, ArrayView1, Axis, Ix2};
use std::fmt;

/// Sample encoding declared by the audio container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compression {
    /// Uncompressed integer PCM
    Pcm,
    /// Uncompressed IEEE float
    Float,
}

/// Header fields of a validated audio container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AudioFormatDescriptor {
    pub compression: Compression,
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
}

/// Peak-normalized mono samples.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Waveform {
    samples: Vec<f32>,
}

impl Waveform {
    pub fn new(samples: Vec<f32>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds at the given sample rate.
    pub fn duration_secs(&self, sample_rate: u32) -> f32 {
        self.samples.len() as f32 / sample_rate as f32
    }
}

/// Per-frame scores over the vocabulary, shape `(frames, vocab_size)`.
///
/// Scores may be probabilities, log-probabilities or logits; only their
/// per-frame ordering matters.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelOutput {
    scores: Array2<f32>,
}

impl ModelOutput {
    pub fn new(scores: Array2<f32>) -> Self {
        Self { scores }
    }

    /// Accept `(frames, vocab)` or `(batch, frames, vocab)` model output.
    ///
    /// A batched output is reduced to its first element.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::UnexpectedShape`] for any other rank, an
    /// empty batch axis or an empty vocabulary axis.
    pub fn from_dyn(array: ArrayD<f32>) -> Result<Self> {
        let shape = array.shape().to_vec();

        let scores = match shape.as_slice() {
            [_, vocab] if *vocab > 0 => array.into_dimensionality::<Ix2>()?,
            [batch, _, vocab] if *batch > 0 && *vocab > 0 => array
                .index_axis_move(Axis(0), 0)
                .into_dimensionality::<Ix2>()?,
            _ => return Err(InferenceError::UnexpectedShape { shape }.into()),
        };

        Ok(Self::new(scores))
    }

    pub fn scores(&self) -> &Array2<f32> {
        &self.scores
    }

    pub fn num_frames(&self) -> usize {
        self.scores.nrows()
    }

    pub fn vocab_size(&self) -> usize {
        self.scores.ncols()
    }

    /// Highest-scoring id of every frame.
    ///
    /// Ties resolve to the lowest id. NaN scores never win; a frame with no
    /// comparable score maps to the blank id so every frame yields one id.
    pub fn argmax_ids(&self) -> Vec<usize> {
        self.scores
            .axis_iter(Axis(0))
            .map(|row| argmax(row).unwrap_or(BLANK_ID))
            .collect()
    }
}

fn argmax(row: ArrayView1<f32>) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;

    for (id, &score) in row.iter().enumerate() {
        if !score.is_nan() && best.is_none_or(|(_, b)| score > b) {
            best = Some((id, score));
        }
    }

    best.map(|(id, _)| id)
}

/// Decoded text: the raw concatenation of subword tokens.
///
/// Word-boundary markers (`▁`) are kept as emitted by the model. Use
/// [`Transcript::to_words`] for space-separated text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transcript {
    text: String,
}

impl Transcript {
    pub fn new(text: String) -> Self {
        Self { text }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn into_string(self) -> String {
        self.text
    }

    /// Render word-boundary markers as spaces and trim the result.
    pub fn to_words(&self) -> String {
        self.text.replace(WORD_BOUNDARY, " ").trim().to_string()
    }
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<Transcript> for String {
    fn from(transcript: Transcript) -> Self {
        transcript.text
    }
}
