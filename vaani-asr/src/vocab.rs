//! Fixed token table shared by the acoustic model and the CTC decoder.

use eyre::{Result, WrapErr, bail};
use std::path::Path;

/// Leading character of a token that starts a new word.
pub const WORD_BOUNDARY: char = '▁';

/// Token id reserved for the CTC blank symbol.
pub const BLANK_ID: usize = 0;

/// Subword table of the Hindi Conformer-CTC model, in id order.
///
/// Any change to this list breaks compatibility with models trained against it.
const HINDI_TOKENS: &[&str] = &[
    "<unk>", "ा", "र", "ी", "▁", "े", "न", "ि", "त", "क", "्", "ल", "म", "स", "ं", "▁स", "ह",
    "ो", "ु", "द", "य", "प", "▁है", "▁के", "ग", "▁ब", "▁म", "व", "▁क", "▁में", "ट", "▁अ", "ज",
    "▁द", "▁प", "▁आ", "्र", "ू", "▁ज", "▁की", "▁र", "ध", "र्", "ों", "ख", "▁का", "्य", "च",
    "ए", "ब", "भ", "ने", "▁को", "▁से", "▁ल", "▁और", "▁प्र", "▁त", "▁कर", "▁व", "ता", "श",
    "▁कि", "▁ह", "▁न", "▁ग", "ना", "▁हो", "ै", "▁पर", "थ", "▁उ", "ड", "▁च", "िक", "णण", "ई",
    "▁हैं", "िया", "▁इस", "फ", "▁वि", "वा", "▁जा", "ष", "ित", "▁श", "ें", "▁ने", "ेश", "ते",
    "इ", "▁भी", "का", "▁एक", "्या", "▁हम", "▁सं", "िल", "ंग", "ड़", "छ", "क्ष", "ौ", "ठ", "़",
    "ॉ", "ओ", "ढ", "घ", "आ", "झ", "ऐ", "ँ", "ऊ", "उ", "ः", "औ", ",", "ऍ", "ॅ", "ॠ", "ऋ", "ऑ",
    "ञ", "ृ", "अ", "ङ",
];

/// Ordered, immutable mapping from token id to subword string.
///
/// Built once at startup and shared read-only between requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Vocabulary {
    tokens: Vec<String>,
}

impl Vocabulary {
    /// Create a vocabulary from tokens in id order.
    pub fn new(tokens: Vec<String>) -> Self {
        Self { tokens }
    }

    /// Built-in table for the Hindi Conformer-CTC model.
    pub fn hindi() -> Self {
        Self::new(HINDI_TOKENS.iter().map(|t| t.to_string()).collect())
    }

    /// Load a vocabulary file versioned alongside a model artifact.
    ///
    /// Each non-empty line is either `token` (id = line position) or
    /// `token id` as in NeMo `vocab.txt` exports. Ids must cover `0..n`
    /// without gaps or duplicates.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read vocabulary: {}", path.display()))?;

        let vocab = Self::parse(&data)
            .wrap_err_with(|| format!("failed to parse vocabulary: {}", path.display()))?;

        tracing::info!(path = %path.display(), tokens = vocab.len(), "vocabulary loaded");

        Ok(vocab)
    }

    fn parse(data: &str) -> Result<Self> {
        let mut pairs: Vec<(usize, &str)> = data
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.trim().is_empty())
            .enumerate()
            .map(|(position, line)| match line.rsplit_once(' ') {
                Some((token, id)) if !token.is_empty() => match id.parse::<usize>() {
                    Ok(id) => (id, token),
                    Err(_) => (position, line),
                },
                _ => (position, line),
            })
            .collect();

        if pairs.is_empty() {
            bail!("vocabulary is empty");
        }

        pairs.sort_by_key(|(id, _)| *id);

        for (expected, (id, token)) in pairs.iter().enumerate() {
            if *id != expected {
                bail!("vocabulary ids are not contiguous: expected id {expected}, found {id} ({token:?})");
            }
        }

        Ok(Self::new(
            pairs.into_iter().map(|(_, t)| t.to_string()).collect(),
        ))
    }

    /// Look up a token; ids outside the table yield `None`.
    pub fn token_for(&self, id: usize) -> Option<&str> {
        self.tokens.get(id).map(String::as_str)
    }

    /// Whether the token for `id` starts a new word.
    pub fn is_word_start(&self, id: usize) -> bool {
        self.token_for(id)
            .is_some_and(|t| t.starts_with(WORD_BOUNDARY))
    }

    pub fn blank_id(&self) -> usize {
        BLANK_ID
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::hindi()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hindi_table_layout() {
        let vocab = Vocabulary::hindi();

        assert_eq!(vocab.len(), 128);
        assert_eq!(vocab.token_for(BLANK_ID), Some("<unk>"));
        assert_eq!(vocab.token_for(4), Some("▁"));
        assert_eq!(vocab.token_for(22), Some("▁है"));
        assert_eq!(vocab.token_for(127), Some("ङ"));
    }

    #[test]
    fn out_of_range_is_absent() {
        let vocab = Vocabulary::hindi();

        assert_eq!(vocab.token_for(128), None);
        assert_eq!(vocab.token_for(9999), None);
        assert!(!vocab.is_word_start(9999));
    }

    #[test]
    fn detects_word_start() {
        let vocab = Vocabulary::hindi();

        assert!(vocab.is_word_start(15)); // ▁स
        assert!(!vocab.is_word_start(13)); // स
    }

    #[test]
    fn parses_plain_lines() {
        let vocab = Vocabulary::parse("<blank>\n▁a\nb\n").unwrap();

        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab.token_for(1), Some("▁a"));
    }

    #[test]
    fn parses_token_id_pairs_out_of_order() {
        let vocab = Vocabulary::parse("b 2\r\n<blank> 0\r\n▁a 1\r\n").unwrap();

        assert_eq!(vocab.token_for(0), Some("<blank>"));
        assert_eq!(vocab.token_for(1), Some("▁a"));
        assert_eq!(vocab.token_for(2), Some("b"));
    }

    #[test]
    fn rejects_gaps() {
        let result = Vocabulary::parse("<blank> 0\nb 2\n");
        assert!(result.is_err());
    }

    #[test]
    fn rejects_empty() {
        assert!(Vocabulary::parse("\n\n").is_err());
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocab.txt");
        std::fs::write(&path, "<unk> 0\n▁क 1\n").unwrap();

        let vocab = Vocabulary::from_file(&path).unwrap();

        assert_eq!(vocab.len(), 2);
        assert!(vocab.is_word_start(1));
    }
}
