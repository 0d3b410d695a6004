// ============================================================
// Layer 4 - Data Pipeline
// ============================================================
// Everything between the CSV files and tensor batches:
//
//   twitter_*.csv
//       │
//       ▼
//   CsvLoader          → rows, label collapse, prompt rendering
//       │
//       ▼
//   TextStandardizer   → lowercase, punctuation to spaces
//       │
//       ▼
//   Vectorizer (infra) → fixed-length token id sequences
//       │
//       ▼
//   SentimentDataset   → implements Burn's Dataset trait
//       │
//       ▼
//   SentimentBatcher   → stacks samples into tensor batches
//       │
//       ▼
//   DataLoader         → feeds shuffled batches to the trainer
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads headerless dataset CSV files into labelled examples
pub mod loader;

/// Normalises text before word splitting
pub mod preprocessor;

/// Implements Burn's Dataset trait for vectorised samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
