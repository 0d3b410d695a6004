// ============================================================
// Layer 5 - Training Loop
// ============================================================
// Minibatch Adam on sparse categorical cross-entropy, with
// per-epoch validation, best-only checkpointing and early
// stopping, both selecting on validation accuracy.
//
//   - Training uses TrainBackend (Autodiff) for gradients
//   - model.valid() returns the model on InferBackend, with
//     dropout disabled, for validation and for checkpointing
//   - The training loader reshuffles every epoch
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::{bail, Result};
use burn::{
    data::dataloader::{DataLoader, DataLoaderBuilder},
    module::AutodiffModule,
    nn::loss::CrossEntropyLossConfig,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
};

use crate::data::{
    batcher::{SentimentBatch, SentimentBatcher},
    dataset::SentimentDataset,
};
use crate::infra::{
    artifact::{ArtifactHeader, ArtifactStore, ModelArtifact, PreprocessingContract},
    metrics::{EpochMetrics, MetricsLogger},
    vectorizer::Vectorizer,
};
use crate::ml::{
    early_stopping::{EarlyStopping, EpochDecision},
    model::{count_correct, SentimentModel, SentimentModelConfig},
    InferBackend, TrainBackend,
};

/// Optimisation settings for one run
#[derive(Debug, Clone)]
pub struct TrainingOptions {
    pub epochs:     usize,
    pub batch_size: usize,
    pub lr:         f64,
    pub patience:   usize,
    pub seed:       u64,
}

/// What a finished run produced
#[derive(Debug, Clone)]
pub struct TrainingSummary {
    pub epochs_run:        usize,
    pub best_epoch:        usize,
    pub best_val_accuracy: f64,
    pub stopped_early:     bool,
}

/// Everything the loop needs to write checkpoints
pub struct CheckpointTarget<'a> {
    pub store:         &'a ArtifactStore,
    pub vectorizer:    &'a Vectorizer,
    pub preprocessing: PreprocessingContract,
    pub metrics:       Option<&'a MetricsLogger>,
}

/// Train a model and persist the best epoch as an artifact.
/// Returns the summary and the best model (weights restored).
pub fn run_training(
    model_cfg:     &SentimentModelConfig,
    opts:          &TrainingOptions,
    train_dataset: SentimentDataset,
    val_dataset:   SentimentDataset,
    target:        CheckpointTarget<'_>,
) -> Result<(TrainingSummary, SentimentModel<InferBackend>)> {
    if opts.epochs == 0 {
        bail!("epochs must be at least 1");
    }
    if opts.batch_size == 0 {
        bail!("batch size must be at least 1");
    }
    if train_dataset.sample_count() == 0 {
        bail!("training set is empty");
    }

    let device = <TrainBackend as Backend>::Device::default();
    tracing::info!("Using device: {:?}", device);
    TrainBackend::seed(opts.seed);

    let mut model: SentimentModel<TrainBackend> = model_cfg.init(&device);
    tracing::info!(
        "Model ready: vocab_size={}, embedding_dim={}, hidden_dim={}",
        model_cfg.vocab_size, model_cfg.embedding_dim, model_cfg.hidden_dim
    );

    let mut optim = AdamConfig::new().init();

    let train_loader = DataLoaderBuilder::new(SentimentBatcher::<TrainBackend>::new(device.clone()))
        .batch_size(opts.batch_size)
        .shuffle(opts.seed)
        .num_workers(1)
        .build(train_dataset);

    let val_loader = DataLoaderBuilder::new(SentimentBatcher::<InferBackend>::new(device.clone()))
        .batch_size(opts.batch_size)
        .num_workers(1)
        .build(val_dataset);

    let mut stopper = EarlyStopping::new(opts.patience);
    let mut best_model: Option<SentimentModel<InferBackend>> = None;
    let mut epochs_run = 0usize;
    let mut stopped_early = false;

    for epoch in 1..=opts.epochs {
        epochs_run = epoch;

        // ── Training phase ────────────────────────────────────────────────────
        let mut loss_sum = 0.0f64;
        let mut batches  = 0usize;
        let mut correct  = 0usize;
        let mut seen     = 0usize;

        for batch in train_loader.iter() {
            seen += batch.labels.dims()[0];
            let (loss, logits) = model.forward_loss(batch.token_ids, batch.labels.clone());
            correct += count_correct(logits, batch.labels);

            loss_sum += loss.clone().into_scalar().elem::<f64>();
            batches  += 1;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(opts.lr, model, grads);
        }

        let train_loss     = if batches > 0 { loss_sum / batches as f64 } else { f64::NAN };
        let train_accuracy = if seen > 0 { correct as f64 / seen as f64 } else { 0.0 };

        // ── Validation phase ──────────────────────────────────────────────────
        let model_valid = model.valid();
        let (val_loss, val_accuracy) = evaluate(&model_valid, &*val_loader);

        let metrics = EpochMetrics::new(epoch, train_loss, train_accuracy, val_loss, val_accuracy);
        tracing::info!(
            "Epoch {:>3}/{} | train_loss={:.4} | train_acc={:.1}% | val_loss={:.4} | val_acc={:.1}%",
            epoch, opts.epochs, train_loss, train_accuracy * 100.0,
            val_loss, val_accuracy * 100.0,
        );
        if let Some(logger) = target.metrics {
            logger.log(&metrics)?;
        }

        match stopper.observe(epoch, val_accuracy) {
            EpochDecision::Improved => {
                let header = ArtifactHeader::new(
                    target.preprocessing.clone(),
                    model_cfg.clone(),
                    epoch,
                    val_accuracy,
                );
                let artifact = ModelArtifact::from_model(header, target.vectorizer, &model_valid)?;
                target.store.save(&artifact)?;
                tracing::info!(
                    "val_accuracy improved to {:.4}, artifact saved to '{}'",
                    val_accuracy,
                    target.store.path().display()
                );
                best_model = Some(model_valid);
            }
            EpochDecision::Continue => {}
            EpochDecision::Stop => {
                tracing::info!(
                    "Early stopping at epoch {}: no improvement over epoch {}",
                    epoch,
                    stopper.best_epoch()
                );
                stopped_early = true;
                break;
            }
        }
    }

    // The first epoch always improves, so a best model exists here.
    let best_model = best_model.ok_or_else(|| anyhow::anyhow!("training produced no checkpoint"))?;
    let summary = TrainingSummary {
        epochs_run,
        best_epoch:        stopper.best_epoch(),
        best_val_accuracy: stopper.best_accuracy().unwrap_or(0.0),
        stopped_early,
    };
    tracing::info!(
        "Training complete: best epoch {} (val_accuracy={:.4}) after {} epochs",
        summary.best_epoch, summary.best_val_accuracy, summary.epochs_run
    );
    Ok((summary, best_model))
}

/// Mean loss and accuracy over a loader. An empty loader scores (NaN, 0).
fn evaluate(
    model:  &SentimentModel<InferBackend>,
    loader: &dyn DataLoader<SentimentBatch<InferBackend>>,
) -> (f64, f64) {
    let mut loss_sum = 0.0f64;
    let mut batches  = 0usize;
    let mut correct  = 0usize;
    let mut seen     = 0usize;

    for batch in loader.iter() {
        let logits = model.forward(batch.token_ids);
        let ce = CrossEntropyLossConfig::new().init(&logits.device());
        loss_sum += ce
            .forward(logits.clone(), batch.labels.clone())
            .into_scalar()
            .elem::<f64>();
        batches += 1;
        seen    += batch.labels.dims()[0];
        correct += count_correct(logits, batch.labels);
    }

    let loss     = if batches > 0 { loss_sum / batches as f64 } else { f64::NAN };
    let accuracy = if seen > 0 { correct as f64 / seen as f64 } else { 0.0 };
    (loss, accuracy)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::SentimentSample;
    use crate::domain::sentiment::NUM_CLASSES;
    use std::path::PathBuf;

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("entity-sentiment-trainer-{}-{name}", std::process::id()))
    }

    fn toy_parts() -> (Vectorizer, SentimentModelConfig, Vec<SentimentSample>) {
        let texts = vec!["great phone".to_string(), "awful battery".to_string()];
        let vectorizer = Vectorizer::fit(&texts, None, 6).unwrap();
        let samples: Vec<SentimentSample> = texts
            .iter()
            .zip([2, 0])
            .map(|(t, label)| SentimentSample { token_ids: vectorizer.encode(t).unwrap(), label })
            .cycle()
            .take(8)
            .collect();
        let cfg = SentimentModelConfig::new(vectorizer.vocab_size(), 8, 8, NUM_CLASSES, 0.0);
        (vectorizer, cfg, samples)
    }

    // An empty validation split scores 0.0 every epoch, so only epoch 1 improves.
    #[test]
    fn test_early_stop_returns_and_saves_best_epoch() {
        let (vectorizer, cfg, samples) = toy_parts();
        let dir = temp_dir("early");
        let store = ArtifactStore::new(dir.join("model.bin"));
        let opts = TrainingOptions { epochs: 10, batch_size: 4, lr: 0.05, patience: 0, seed: 11 };

        let (summary, best_model) = run_training(
            &cfg,
            &opts,
            SentimentDataset::new(samples),
            SentimentDataset::new(Vec::new()),
            CheckpointTarget {
                store:         &store,
                vectorizer:    &vectorizer,
                preprocessing: PreprocessingContract::current(6),
                metrics:       None,
            },
        )
        .unwrap();

        assert!(summary.stopped_early);
        assert_eq!(summary.epochs_run, 2);
        assert_eq!(summary.best_epoch, 1);
        assert!(summary.best_epoch < summary.epochs_run);

        let artifact = store.load().unwrap();
        assert_eq!(artifact.header.best_epoch, summary.best_epoch);

        // The returned model is the checkpointed one, not the last epoch's weights
        let device = Default::default();
        let saved: SentimentModel<InferBackend> = artifact.model(&device).unwrap();
        let ids = vectorizer.encode("great battery").unwrap();
        let flat: Vec<i32> = ids.iter().map(|&id| id as i32).collect();
        let input = Tensor::<InferBackend, 1, Int>::from_ints(flat.as_slice(), &device).reshape([1, ids.len()]);
        let a: Vec<f32> = best_model.forward(input.clone()).into_data().to_vec::<f32>().unwrap();
        let b: Vec<f32> = saved.forward(input).into_data().to_vec::<f32>().unwrap();
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-6);
        }

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_patience_allows_stale_epochs_before_stopping() {
        let (vectorizer, cfg, samples) = toy_parts();
        let dir = temp_dir("patience");
        let store = ArtifactStore::new(dir.join("model.bin"));
        let opts = TrainingOptions { epochs: 10, batch_size: 4, lr: 0.05, patience: 2, seed: 11 };

        let (summary, _) = run_training(
            &cfg,
            &opts,
            SentimentDataset::new(samples),
            SentimentDataset::new(Vec::new()),
            CheckpointTarget {
                store:         &store,
                vectorizer:    &vectorizer,
                preprocessing: PreprocessingContract::current(6),
                metrics:       None,
            },
        )
        .unwrap();

        assert!(summary.stopped_early);
        assert_eq!(summary.epochs_run, 4);
        assert_eq!(summary.best_epoch, 1);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_empty_training_set_is_rejected() {
        let (vectorizer, cfg, _) = toy_parts();
        let store = ArtifactStore::new(temp_dir("empty").join("model.bin"));
        let opts = TrainingOptions { epochs: 1, batch_size: 4, lr: 0.05, patience: 0, seed: 11 };
        let result = run_training(
            &cfg,
            &opts,
            SentimentDataset::new(Vec::new()),
            SentimentDataset::new(Vec::new()),
            CheckpointTarget {
                store:         &store,
                vectorizer:    &vectorizer,
                preprocessing: PreprocessingContract::current(6),
                metrics:       None,
            },
        );
        assert!(result.is_err());
        assert!(!store.path().exists());
    }
}
