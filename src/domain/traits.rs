// ============================================================
// Layer 3 - Core Traits (Abstractions)
// ============================================================
// The application layer programs against these traits, not
// against Kaggle or Burn directly:
//
//   - KaggleDataset implements DatasetSource
//   - Inferencer    implements SentimentPredictor
//
// Tests swap in local folders and mock predictors without
// touching the network or loading a trained artifact.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)
//            Rust Book §17 (Trait Objects)

use anyhow::Result;
use std::path::PathBuf;

use crate::domain::record::Prediction;

// ─── DatasetSource ────────────────────────────────────────────────────────────
/// Anything that can make the labelled dataset available locally.
pub trait DatasetSource {
    /// Fetch the dataset and return the folder holding the CSV files.
    fn fetch(&self) -> Result<PathBuf>;

    /// Human readable identifier used in log messages
    fn describe(&self) -> String;
}

// ─── SentimentPredictor ───────────────────────────────────────────────────────
/// Anything that can score an (entity, text) pair.
///
/// Shared across request handlers behind an Arc, hence Send + Sync.
/// `predict` may block; async callers must move it off the runtime.
pub trait SentimentPredictor: Send + Sync {
    fn predict(&self, entity: &str, text: &str) -> Result<Prediction>;
}
