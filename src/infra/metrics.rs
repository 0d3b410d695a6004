// ============================================================
// Layer 6 - Metrics Logger
// ============================================================
// Appends one CSV row per training epoch next to the artifact.
//
// Output file: models/training_metrics.csv
//
//   epoch,train_loss,train_accuracy,val_loss,val_accuracy
//   1,0.981203,0.512344,0.902113,0.588000
//   2,0.801871,0.640120,0.850342,0.623000
//
// The header is written only when the file is created, so
// repeated runs append to the same log.
//
// Reference: csv crate documentation

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
};

/// File name of the per-epoch log
pub const METRICS_FILE: &str = "training_metrics.csv";

/// One row of metrics for a single epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Mean cross-entropy over training batches
    pub train_loss: f64,

    /// Fraction of training rows classified correctly (dropout active)
    pub train_accuracy: f64,

    /// Mean cross-entropy over validation batches
    pub val_loss: f64,

    /// Fraction of validation rows classified correctly.
    /// Early stopping and checkpointing select on this value.
    pub val_accuracy: f64,
}

impl EpochMetrics {
    pub fn new(
        epoch:          usize,
        train_loss:     f64,
        train_accuracy: f64,
        val_loss:       f64,
        val_accuracy:   f64,
    ) -> Self {
        Self { epoch, train_loss, train_accuracy, val_loss, val_accuracy }
    }
}

/// Appends epoch metrics to a CSV file.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a logger writing `training_metrics.csv` inside `dir`.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create metrics directory '{}'", dir.display()))?;
        Ok(Self { csv_path: dir.join(METRICS_FILE) })
    }

    /// Append one epoch's metrics as a new row.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let is_new = !self.csv_path.exists();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(is_new)
            .from_writer(file);
        writer.serialize(m)?;
        writer.flush()?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, val_accuracy={:.4}",
            m.epoch,
            m.train_loss,
            m.val_accuracy,
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_written_once_then_rows_appended() {
        let dir = std::env::temp_dir().join(format!("entity-sentiment-metrics-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);

        let logger = MetricsLogger::new(&dir).unwrap();
        logger.log(&EpochMetrics::new(1, 1.0, 0.5, 1.1, 0.4)).unwrap();
        logger.log(&EpochMetrics::new(2, 0.5, 0.7, 0.9, 0.6)).unwrap();

        let content = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "epoch,train_loss,train_accuracy,val_loss,val_accuracy");
        assert!(lines[2].starts_with("2,"));

        fs::remove_dir_all(&dir).unwrap();
    }
}
