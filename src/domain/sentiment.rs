// ============================================================
// Layer 3 - Sentiment Labels and Classes
// ============================================================
// The dataset annotates every row with one of four labels:
//
//   Negative | Neutral | Irrelevant | Positive
//
// The classifier only predicts three classes. Irrelevant is
// folded into Neutral on purpose:
//
//   Negative   -> 0
//   Neutral    -> 1
//   Irrelevant -> 1
//   Positive   -> 2
//
// Decoding class 1 is therefore ambiguous. We decode it as
// "Neutral" and expose both source labels through
// SentimentClass::source_labels() for callers that care.
//
// Reference: Rust Book §6 (Enums and Pattern Matching)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Column names of the raw CSV files, in file order.
/// The files have no header row.
pub const CSV_COLUMNS: [&str; 4] = ["tweet_id", "entity", "sentiment", "text"];

/// Number of output classes of the classifier
pub const NUM_CLASSES: usize = 3;

/// A sentiment label exactly as it appears in the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    Negative,
    Neutral,
    Irrelevant,
    Positive,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 4] = [
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
        SentimentLabel::Irrelevant,
        SentimentLabel::Positive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Negative   => "Negative",
            SentimentLabel::Neutral    => "Neutral",
            SentimentLabel::Irrelevant => "Irrelevant",
            SentimentLabel::Positive   => "Positive",
        }
    }

    /// The training class this label collapses into
    pub fn class(&self) -> SentimentClass {
        match self {
            SentimentLabel::Negative   => SentimentClass::Negative,
            SentimentLabel::Neutral    => SentimentClass::Neutral,
            SentimentLabel::Irrelevant => SentimentClass::Neutral,
            SentimentLabel::Positive   => SentimentClass::Positive,
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a CSV cell holds a label outside the known four.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sentiment label '{0}'")]
pub struct UnknownLabel(pub String);

impl FromStr for SentimentLabel {
    type Err = UnknownLabel;

    /// Matching is exact and case-sensitive, like the dataset itself.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SentimentLabel::ALL
            .iter()
            .copied()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| UnknownLabel(s.to_string()))
    }
}

/// One of the three classes the model is trained to predict.
/// The discriminant is the class index used in tensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentClass {
    Negative = 0,
    Neutral  = 1,
    Positive = 2,
}

impl SentimentClass {
    pub const ALL: [SentimentClass; NUM_CLASSES] = [
        SentimentClass::Negative,
        SentimentClass::Neutral,
        SentimentClass::Positive,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        SentimentClass::ALL.get(index).copied()
    }

    /// The label reported to API callers.
    /// Class 1 is reported as Neutral, never as Irrelevant.
    pub fn label(&self) -> SentimentLabel {
        match self {
            SentimentClass::Negative => SentimentLabel::Negative,
            SentimentClass::Neutral  => SentimentLabel::Neutral,
            SentimentClass::Positive => SentimentLabel::Positive,
        }
    }

    /// Every dataset label that collapses into this class.
    pub fn source_labels(&self) -> &'static [SentimentLabel] {
        match self {
            SentimentClass::Negative => &[SentimentLabel::Negative],
            SentimentClass::Neutral  => &[SentimentLabel::Neutral, SentimentLabel::Irrelevant],
            SentimentClass::Positive => &[SentimentLabel::Positive],
        }
    }
}

impl fmt::Display for SentimentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label().as_str())
    }
}

/// Map a raw dataset label to its training class.
/// Returns None for anything outside the four known labels;
/// the caller decides whether that row is dropped or rejected.
pub fn label_to_class(raw: &str) -> Option<SentimentClass> {
    raw.parse::<SentimentLabel>().ok().map(|label| label.class())
}

/// Decode a predicted class index into the label reported to callers.
pub fn class_to_label(index: usize) -> Option<SentimentLabel> {
    SentimentClass::from_index(index).map(|class| class.label())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_labels_map_into_three_classes() {
        for label in SentimentLabel::ALL {
            let class = label_to_class(label.as_str()).unwrap();
            assert!(class.index() < NUM_CLASSES);
        }
        assert_eq!(label_to_class("Negative"),   Some(SentimentClass::Negative));
        assert_eq!(label_to_class("Neutral"),    Some(SentimentClass::Neutral));
        assert_eq!(label_to_class("Irrelevant"), Some(SentimentClass::Neutral));
        assert_eq!(label_to_class("Positive"),   Some(SentimentClass::Positive));
    }

    #[test]
    fn test_unrecognised_label_has_no_class() {
        // Known gap: the dataset never promises a closed label set.
        // Unknown labels yield None and are handled by the loader policy.
        assert_eq!(label_to_class("Mixed"), None);
        assert_eq!(label_to_class("positive"), None);
        assert_eq!(label_to_class(""), None);
        assert_eq!(
            "Mixed".parse::<SentimentLabel>(),
            Err(UnknownLabel("Mixed".to_string()))
        );
    }

    #[test]
    fn test_class_index_round_trip() {
        for class in SentimentClass::ALL {
            assert_eq!(SentimentClass::from_index(class.index()), Some(class));
        }
        assert_eq!(SentimentClass::from_index(3), None);
    }

    #[test]
    fn test_neutral_decodes_as_neutral_and_keeps_both_sources() {
        assert_eq!(class_to_label(1), Some(SentimentLabel::Neutral));
        assert_eq!(
            SentimentClass::Neutral.source_labels(),
            &[SentimentLabel::Neutral, SentimentLabel::Irrelevant]
        );
        assert_eq!(class_to_label(7), None);
    }

    #[test]
    fn test_csv_columns_order() {
        assert_eq!(CSV_COLUMNS, ["tweet_id", "entity", "sentiment", "text"]);
    }
}
