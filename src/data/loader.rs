// ============================================================
// Layer 4 - CSV Loader
// ============================================================
// Reads one of the dataset CSV files and turns every row into
// a LabeledExample ready for vectorisation.
//
// File layout (no header row):
//
//   tweet_id, entity, sentiment, text
//   2401,Borderlands,Positive,"im getting on borderlands and i will murder you all ,"
//
// Rows are read as raw bytes and decoded lossily; the public
// dataset contains a handful of invalid UTF-8 sequences.
// A missing trailing column is read as an empty string.
//
// Unknown sentiment labels are governed by UnknownLabelPolicy:
//   Drop   - skip the row, count it, warn once per file
//   Reject - abort with the row number
//
// Reference: csv crate documentation
//            Rust Book §9 (Error Handling)

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use csv::{ByteRecord, ReaderBuilder};
use std::{io::Read, path::PathBuf};

use crate::domain::prompt::PromptTemplate;
use crate::domain::record::{LabeledExample, TrainingRecord};
use crate::domain::sentiment::{label_to_class, CSV_COLUMNS};

/// File names the dataset is expected to contain
pub const TRAINING_FILE:   &str = "twitter_training.csv";
pub const VALIDATION_FILE: &str = "twitter_validation.csv";

/// What to do with a row whose sentiment label is not one of the known four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum UnknownLabelPolicy {
    /// Skip the row and report how many were skipped
    #[default]
    Drop,
    /// Stop loading with an error naming the row
    Reject,
}

/// Result of loading one CSV file
#[derive(Debug, Clone)]
pub struct LoadedSplit {
    pub examples: Vec<LabeledExample>,
    /// Rows skipped because of an unknown label
    pub dropped:  usize,
}

/// Loads a single headerless dataset CSV.
pub struct CsvLoader {
    path: PathBuf,
}

impl CsvLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read every row, map labels and render prompts.
    pub fn load(&self, template: PromptTemplate, policy: UnknownLabelPolicy) -> Result<LoadedSplit> {
        let file = std::fs::File::open(&self.path)
            .with_context(|| format!("Cannot open dataset file '{}'", self.path.display()))?;

        let split = read_examples(file, template, policy)
            .with_context(|| format!("Cannot read dataset file '{}'", self.path.display()))?;

        if split.dropped > 0 {
            tracing::warn!(
                "Dropped {} rows with an unknown sentiment label from '{}'",
                split.dropped,
                self.path.display()
            );
        }
        tracing::info!(
            "Loaded {} labelled rows from '{}'",
            split.examples.len(),
            self.path.display()
        );
        Ok(split)
    }
}

/// Parse raw CSV rows from any reader.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<TrainingRecord>> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    let mut row = ByteRecord::new();
    while csv_reader.read_byte_record(&mut row)? {
        let field = |i: usize| {
            row.get(i)
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
                .unwrap_or_default()
        };
        records.push(TrainingRecord {
            tweet_id:  field(0),
            entity:    field(1),
            sentiment: field(2),
            text:      field(3),
        });
    }
    Ok(records)
}

/// Parse rows, map labels through the class collapse and render prompts.
pub fn read_examples<R: Read>(
    reader:   R,
    template: PromptTemplate,
    policy:   UnknownLabelPolicy,
) -> Result<LoadedSplit> {
    let records = read_records(reader)?;

    let mut examples = Vec::with_capacity(records.len());
    let mut dropped  = 0usize;

    for (row_index, record) in records.into_iter().enumerate() {
        match label_to_class(&record.sentiment) {
            Some(class) => examples.push(LabeledExample {
                input_text: template.render(&record.entity, &record.text),
                class,
            }),
            None => match policy {
                UnknownLabelPolicy::Drop => {
                    tracing::debug!(
                        "Row {} (tweet_id={}): unknown {} '{}'",
                        row_index + 1,
                        record.tweet_id,
                        CSV_COLUMNS[2],
                        record.sentiment
                    );
                    dropped += 1;
                }
                UnknownLabelPolicy::Reject => bail!(
                    "Row {} (tweet_id={}) has unknown {} '{}'",
                    row_index + 1,
                    record.tweet_id,
                    CSV_COLUMNS[2],
                    record.sentiment
                ),
            },
        }
    }

    Ok(LoadedSplit { examples, dropped })
}
