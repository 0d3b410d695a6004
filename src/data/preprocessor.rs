// ============================================================
// Layer 4 - Text Standardizer
// ============================================================
// Normalises a rendered prompt before it is split into words.
// Runs identically when the vocabulary is fitted and when a
// request is encoded, so it lives in exactly one place.
//
// Steps (applied in order):
//   1. Lowercase (Unicode aware)
//   2. Every character that is not alphanumeric becomes a space
//      (punctuation, markup such as <e> and </e>, control chars)
//   3. Collapse runs of whitespace into one space and trim
//
// The entity markers survive as the bare word "e" on each side
// of the entity, which is enough for the embedding to learn
// where the entity sits.
//
// Any change to these steps must bump STANDARDIZER_VERSION so
// artifacts trained with the old behaviour are refused.
//
// Reference: Rust Book §8 (Strings in Rust)

/// Version recorded in every trained artifact
pub const STANDARDIZER_VERSION: u32 = 1;

pub struct TextStandardizer;

impl TextStandardizer {
    pub fn new() -> Self {
        Self
    }

    /// Standardize a string for word-level tokenisation.
    pub fn standardize(&self, text: &str) -> String {
        let spaced: String = text
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { ' ' })
            .collect();

        spaced.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Standardize and split into words.
    /// Splitting on whitespace matches the tokenizer's WhitespaceSplit
    /// pre-tokenizer, so counted words are exactly the tokens looked up.
    pub fn words(&self, text: &str) -> Vec<String> {
        self.standardize(text)
            .split(' ')
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl Default for TextStandardizer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_strips_punctuation() {
        let s = TextStandardizer::new();
        assert_eq!(s.standardize("I LOVE it!!! :)"), "i love it");
    }

    #[test]
    fn test_entity_markers_become_words() {
        let s = TextStandardizer::new();
        assert_eq!(
            s.standardize("about [ENTITY] <e>Apple</e> in: great"),
            "about entity e apple e in great"
        );
    }

    #[test]
    fn test_collapses_whitespace_and_control_chars() {
        let s = TextStandardizer::new();
        assert_eq!(s.standardize("  a\t\tb\n\x01c  "), "a b c");
    }

    #[test]
    fn test_keeps_unicode_letters_and_digits() {
        let s = TextStandardizer::new();
        assert_eq!(s.standardize("Café 2024 Ünï"), "café 2024 ünï");
    }

    #[test]
    fn test_empty_and_punctuation_only() {
        let s = TextStandardizer::new();
        assert_eq!(s.standardize(""), "");
        assert_eq!(s.standardize("?!..."), "");
        assert!(s.words("?!...").is_empty());
    }

    #[test]
    fn test_words_split() {
        let s = TextStandardizer::new();
        assert_eq!(s.words("Hello, World"), vec!["hello", "world"]);
    }
}
