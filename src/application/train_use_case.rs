// ============================================================
// Layer 2 - TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load both CSV splits           (Layer 4 - data)
//   Step 2: Fit vocabulary on train inputs (Layer 6 - infra)
//   Step 3: Vectorise both splits          (Layer 4 - data)
//   Step 4: Build Burn datasets            (Layer 4 - data)
//   Step 5: Run training loop              (Layer 5 - ml)
//           (checkpoints the best epoch into the artifact)
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use anyhow::{bail, Result};
use std::path::PathBuf;

use crate::data::{
    dataset::{SentimentDataset, SentimentSample},
    loader::{CsvLoader, UnknownLabelPolicy, TRAINING_FILE, VALIDATION_FILE},
};
use crate::domain::{
    record::LabeledExample,
    sentiment::{SentimentClass, NUM_CLASSES},
};
use crate::infra::{
    artifact::{ArtifactStore, PreprocessingContract, DEFAULT_MODEL_PATH},
    metrics::MetricsLogger,
    vectorizer::Vectorizer,
};
use crate::ml::{
    model::SentimentModelConfig,
    trainer::{run_training, CheckpointTarget, TrainingOptions, TrainingSummary},
};

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run. The model-shaping ones
// end up in the artifact header so serving can rebuild the model.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub data_folder:     PathBuf,
    pub model_path:      PathBuf,
    pub epochs:          usize,
    pub batch_size:      usize,
    pub lr:              f64,
    pub sequence_length: usize,
    pub embedding_dim:   usize,
    pub hidden_dim:      usize,
    pub dropout:         f64,
    /// Vocabulary cap, including [PAD] and [UNK]
    pub max_tokens:      Option<usize>,
    pub patience:        usize,
    pub seed:            u64,
    pub label_policy:    UnknownLabelPolicy,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_folder:     PathBuf::from("data"),
            model_path:      PathBuf::from(DEFAULT_MODEL_PATH),
            epochs:          6,
            batch_size:      32,
            lr:              1e-3,
            sequence_length: 64,
            embedding_dim:   64,
            hidden_dim:      64,
            dropout:         0.3,
            max_tokens:      None,
            patience:        0,
            seed:            42,
            label_policy:    UnknownLabelPolicy::Drop,
        }
    }
}

impl TrainConfig {
    fn validate(&self) -> Result<()> {
        if self.sequence_length == 0 {
            bail!("sequence length must be at least 1");
        }
        if self.embedding_dim == 0 || self.hidden_dim == 0 {
            bail!("embedding and hidden dimensions must be at least 1");
        }
        if !(0.0..1.0).contains(&self.dropout) {
            bail!("dropout must be in [0, 1), got {}", self.dropout);
        }
        if let Some(max) = self.max_tokens {
            if max < 3 {
                bail!("max tokens must leave room for [PAD], [UNK] and one word, got {max}");
            }
        }
        Ok(())
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<TrainingSummary> {
        let cfg = &self.config;
        cfg.validate()?;
        // The template recorded in the artifact is the one rows are rendered with
        let contract = PreprocessingContract::current(cfg.sequence_length);
        let template = contract.prompt_template;

        // ── Step 1: Load both splits ──────────────────────────────────────────
        tracing::info!("Loading dataset from '{}'", cfg.data_folder.display());
        let train = CsvLoader::new(cfg.data_folder.join(TRAINING_FILE)).load(template, cfg.label_policy)?;
        let val   = CsvLoader::new(cfg.data_folder.join(VALIDATION_FILE)).load(template, cfg.label_policy)?;
        if train.examples.is_empty() {
            bail!("no usable rows in '{}'", cfg.data_folder.join(TRAINING_FILE).display());
        }
        if val.examples.is_empty() {
            tracing::warn!("Validation split is empty; early stopping will only see epoch 1");
        }

        // ── Step 2: Fit the vocabulary on training inputs only ────────────────
        let train_texts: Vec<String> = train.examples.iter().map(|e| e.input_text.clone()).collect();
        let vectorizer = Vectorizer::fit(&train_texts, cfg.max_tokens, cfg.sequence_length)?;
        tracing::info!("Vocabulary size: {}", vectorizer.vocab_size());

        // ── Step 3/4: Vectorise and wrap as Burn datasets ─────────────────────
        let train_dataset = SentimentDataset::new(build_samples(&train.examples, &vectorizer)?);
        let val_dataset   = SentimentDataset::new(build_samples(&val.examples, &vectorizer)?);
        log_balance("train", &train_dataset);
        log_balance("validation", &val_dataset);

        // ── Step 5: Train, checkpointing the best epoch ───────────────────────
        let store   = ArtifactStore::new(&cfg.model_path);
        let metrics = MetricsLogger::new(store.dir())?;
        let model_cfg = SentimentModelConfig::new(
            vectorizer.vocab_size(),
            cfg.embedding_dim,
            cfg.hidden_dim,
            NUM_CLASSES,
            cfg.dropout,
        );
        let opts = TrainingOptions {
            epochs:     cfg.epochs,
            batch_size: cfg.batch_size,
            lr:         cfg.lr,
            patience:   cfg.patience,
            seed:       cfg.seed,
        };

        let (summary, _best_model) = run_training(
            &model_cfg,
            &opts,
            train_dataset,
            val_dataset,
            CheckpointTarget {
                store:         &store,
                vectorizer:    &vectorizer,
                preprocessing: contract,
                metrics:       Some(&metrics),
            },
        )?;

        tracing::info!(
            "Artifact at '{}', metrics at '{}'",
            store.path().display(),
            metrics.csv_path().display()
        );
        Ok(summary)
    }
}

/// Vectorise labelled examples into training samples.
pub fn build_samples(examples: &[LabeledExample], vectorizer: &Vectorizer) -> Result<Vec<SentimentSample>> {
    examples
        .iter()
        .map(|e| {
            Ok(SentimentSample {
                token_ids: vectorizer.encode(&e.input_text)?,
                label:     e.class.index(),
            })
        })
        .collect()
}

fn log_balance(split: &str, dataset: &SentimentDataset) {
    let counts = dataset.class_counts(NUM_CLASSES);
    let summary: Vec<String> = SentimentClass::ALL
        .iter()
        .zip(&counts)
        .map(|(c, n)| {
            let sources: Vec<&str> = c.source_labels().iter().map(|l| l.as_str()).collect();
            format!("{c}[{}]={n}", sources.join("+"))
        })
        .collect();
    tracing::info!("{} split: {} rows ({})", split, dataset.sample_count(), summary.join(", "));
}
