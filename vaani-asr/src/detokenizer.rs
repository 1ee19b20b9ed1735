//! Greedy CTC decoding of model output into a transcript.

use crate::types::{ModelOutput, Transcript};
use crate::vocab::Vocabulary;

/// Greedy CTC decoder.
///
/// Collapses the per-frame argmax sequence: repeated ids emit once, blanks
/// emit nothing and ids outside the vocabulary are skipped. Stateless between
/// calls.
#[derive(Clone, Debug, Default)]
pub struct CtcGreedyDecoder {
    vocabulary: Vocabulary,
}

impl CtcGreedyDecoder {
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Decode model output to a transcript.
    pub fn decode(&self, output: &ModelOutput) -> Transcript {
        self.decode_ids(output.argmax_ids())
    }

    /// Decode a per-frame argmax id sequence.
    pub fn decode_ids(&self, ids: impl IntoIterator<Item = usize>) -> Transcript {
        let blank_id = self.vocabulary.blank_id();

        let mut text = String::new();
        let mut previous = None;
        let mut tokens = 0usize;
        let mut words = 0usize;

        for id in ids {
            if previous == Some(id) {
                continue;
            }
            previous = Some(id);

            if id == blank_id {
                continue;
            }

            match self.vocabulary.token_for(id) {
                Some(token) => {
                    text.push_str(token);
                    tokens += 1;
                    words += usize::from(self.vocabulary.is_word_start(id));
                }
                None => tracing::trace!(id, "skipping id outside vocabulary"),
            }
        }

        tracing::trace!(tokens, words, "ctc decode complete");

        Transcript::new(text)
    }
}
