// ============================================================
// Layer 3 - Training Rows and Predictions
// ============================================================

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::domain::sentiment::{SentimentClass, NUM_CLASSES};

/// One raw row of the dataset, in CSV column order.
/// `tweet_id` is not used downstream; it is kept so log
/// messages can point at the offending row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingRecord {
    pub tweet_id:  String,
    pub entity:    String,
    pub sentiment: String,
    pub text:      String,
}

/// A row after the label was mapped and the prompt rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledExample {
    pub input_text: String,
    pub class:      SentimentClass,
}

/// Output of one forward pass, decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Arg-max class
    pub class: SentimentClass,
    /// Probability of `class`, i.e. the max of `probabilities`
    pub confidence: f32,
    /// Softmax output, indexed by class
    pub probabilities: [f32; NUM_CLASSES],
}

impl Prediction {
    /// Decode a softmax distribution.
    ///
    /// Ties resolve to the lowest class index.
    pub fn from_probabilities(probabilities: &[f32]) -> Result<Self> {
        if probabilities.len() != NUM_CLASSES {
            bail!(
                "expected {NUM_CLASSES} class probabilities, got {}",
                probabilities.len()
            );
        }
        if probabilities.iter().any(|p| !p.is_finite()) {
            bail!("model produced non-finite probabilities: {probabilities:?}");
        }

        let mut best = 0usize;
        for (i, &p) in probabilities.iter().enumerate() {
            if p > probabilities[best] {
                best = i;
            }
        }

        let class = SentimentClass::from_index(best)
            .ok_or_else(|| anyhow::anyhow!("class index {best} out of range"))?;

        let mut fixed = [0.0f32; NUM_CLASSES];
        fixed.copy_from_slice(probabilities);

        Ok(Self {
            class,
            confidence: probabilities[best],
            probabilities: fixed,
        })
    }
}
