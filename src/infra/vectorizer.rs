// ============================================================
// Layer 6 - Vectorizer
// ============================================================
// Turns a rendered prompt into a fixed-length sequence of token
// ids. Fitted once on the training inputs, then serialised into
// the model artifact so serving uses the identical vocabulary.
//
// Vocabulary layout:
//   0      [PAD]   padding, masked out by the model
//   1      [UNK]   any word not seen during fitting
//   2..    words ordered by frequency (desc), then alphabetically
//
// The vocabulary is written as a HuggingFace word-level
// tokenizer JSON and loaded back through tokenizers, the same
// way for a fresh fit and for an artifact read from disk.
//
// Reference: tokenizers crate (WordLevel model)

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::str::FromStr;
use tokenizers::Tokenizer;

use crate::data::preprocessor::TextStandardizer;

pub const PAD_TOKEN: &str = "[PAD]";
pub const UNK_TOKEN: &str = "[UNK]";
pub const PAD_ID: u32 = 0;
pub const UNK_ID: u32 = 1;

/// Number of ids reserved before the first real word
const RESERVED_IDS: usize = 2;

pub struct Vectorizer {
    tokenizer:       Tokenizer,
    sequence_length: usize,
    standardizer:    TextStandardizer,
}

impl Vectorizer {
    /// Fit a vocabulary on `texts`.
    ///
    /// `max_tokens` caps the vocabulary size including [PAD] and [UNK];
    /// None keeps every word seen.
    pub fn fit(texts: &[String], max_tokens: Option<usize>, sequence_length: usize) -> Result<Self> {
        let standardizer = TextStandardizer::new();

        let mut freq: HashMap<String, usize> = HashMap::new();
        for text in texts {
            for word in standardizer.words(text) {
                *freq.entry(word).or_insert(0) += 1;
            }
        }

        let mut words: Vec<(String, usize)> = freq.into_iter().collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        if let Some(max) = max_tokens {
            words.truncate(max.saturating_sub(RESERVED_IDS));
        }

        let json = tokenizer_json(words.iter().map(|(w, _)| w.as_str()));
        let vectorizer = Self::from_json(&json, sequence_length)?;

        tracing::info!(
            "Vocabulary fitted: {} tokens from {} texts (sequence_length={})",
            vectorizer.vocab_size(),
            texts.len(),
            sequence_length
        );
        Ok(vectorizer)
    }

    /// Rebuild a vectorizer from a serialised tokenizer.
    pub fn from_json(json: &str, sequence_length: usize) -> Result<Self> {
        let tokenizer = Tokenizer::from_str(json)
            .map_err(|e| anyhow::anyhow!("Cannot parse tokenizer JSON: {e}"))?;
        Ok(Self {
            tokenizer,
            sequence_length,
            standardizer: TextStandardizer::new(),
        })
    }

    /// Serialise the tokenizer for storage in the artifact.
    pub fn to_json(&self) -> Result<String> {
        self.tokenizer
            .to_string(false)
            .map_err(|e| anyhow::anyhow!("Cannot serialise tokenizer: {e}"))
    }

    /// Vocabulary size including the reserved ids.
    /// [PAD] and [UNK] live in the model vocab, so the added-token
    /// table is not counted a second time.
    pub fn vocab_size(&self) -> usize {
        self.tokenizer.get_vocab_size(false)
    }

    pub fn sequence_length(&self) -> usize {
        self.sequence_length
    }

    /// Encode a rendered prompt into exactly `sequence_length` ids.
    /// Longer inputs are truncated, shorter ones padded with PAD_ID.
    pub fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let standardized = self.standardizer.standardize(text);
        let encoding = self
            .tokenizer
            .encode(standardized.as_str(), false)
            .map_err(|e| anyhow::anyhow!("Tokenisation error: {e}"))
            .with_context(|| format!("while encoding {text:?}"))?;

        let mut ids: Vec<u32> = encoding.get_ids().to_vec();
        ids.truncate(self.sequence_length);
        ids.resize(self.sequence_length, PAD_ID);
        Ok(ids)
    }
}

/// Build a word-level tokenizer JSON in HuggingFace format.
/// Text is standardised before it reaches the tokenizer, so the
/// pipeline only needs to split on whitespace.
fn tokenizer_json<'a>(words: impl Iterator<Item = &'a str>) -> String {
    let mut vocab = serde_json::Map::new();
    vocab.insert(PAD_TOKEN.to_string(), serde_json::json!(PAD_ID));
    vocab.insert(UNK_TOKEN.to_string(), serde_json::json!(UNK_ID));

    let mut next_id = RESERVED_IDS;
    for word in words {
        if !vocab.contains_key(word) {
            vocab.insert(word.to_string(), serde_json::json!(next_id));
            next_id += 1;
        }
    }

    serde_json::json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [
            {"id": PAD_ID, "content": PAD_TOKEN, "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
            {"id": UNK_ID, "content": UNK_TOKEN, "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true}
        ],
        "normalizer": null,
        "pre_tokenizer": { "type": "WhitespaceSplit" },
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": vocab,
            "unk_token": UNK_TOKEN
        }
    })
    .to_string()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<String> {
        vec![
            "good good good movie".to_string(),
            "bad movie".to_string(),
            "Good, GOOD!".to_string(),
        ]
    }

    #[test]
    fn test_reserved_ids_and_frequency_order() {
        let v = Vectorizer::fit(&corpus(), None, 6).unwrap();
        // "good" x5, "movie" x2, "bad" x1
        assert_eq!(v.encode("good movie bad").unwrap(), vec![2, 3, 4, PAD_ID, PAD_ID, PAD_ID]);
        assert_eq!(v.encode("unseen").unwrap(), vec![UNK_ID, PAD_ID, PAD_ID, PAD_ID, PAD_ID, PAD_ID]);
        assert_eq!(v.vocab_size(), 5);
    }

    #[test]
    fn test_encode_pads_truncates_and_maps_unknown() {
        let v = Vectorizer::fit(&corpus(), None, 4).unwrap();
        assert_eq!(v.encode("Bad movie").unwrap(), vec![4, 3, 0, 0]);
        assert_eq!(v.encode("terrible movie").unwrap(), vec![UNK_ID, 3, 0, 0]);
        assert_eq!(
            v.encode("good good good good good good").unwrap(),
            vec![2, 2, 2, 2]
        );
        assert_eq!(v.encode("").unwrap(), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_max_tokens_caps_vocabulary() {
        let v = Vectorizer::fit(&corpus(), Some(3), 4).unwrap();
        assert_eq!(v.vocab_size(), 3);
        assert_eq!(v.encode("bad good").unwrap(), vec![UNK_ID, 2, 0, 0]);
    }

    #[test]
    fn test_json_round_trip_keeps_encoding() {
        let v = Vectorizer::fit(&corpus(), None, 6).unwrap();
        let json = v.to_json().unwrap();
        let restored = Vectorizer::from_json(&json, 6).unwrap();
        assert_eq!(restored.vocab_size(), v.vocab_size());
        assert_eq!(
            restored.encode("good bad movie?").unwrap(),
            v.encode("good bad movie?").unwrap()
        );
    }

    #[test]
    fn test_alphabetical_tie_break_is_deterministic() {
        let texts = vec!["zebra apple".to_string(), "mango".to_string()];
        let v = Vectorizer::fit(&texts, None, 4).unwrap();
        assert_eq!(v.encode("apple mango zebra").unwrap(), vec![2, 3, 4, 0]);
    }
}
