// ============================================================
// Layer 5 - Inferencer
// ============================================================
// Loads a trained artifact once and classifies (entity, text)
// pairs with exactly the preprocessing recorded at training time:
//
//   (entity, text)
//     → prompt template (from the artifact)
//     → standardise + vectorise (fitted vocabulary)
//     → forward + softmax
//     → arg-max class, confidence = max probability
//
// Burn modules are Send but not guaranteed Sync, so the model is
// kept behind a Mutex and the Inferencer can be shared across
// request handlers as an Arc<dyn SentimentPredictor>.

use anyhow::{Context, Result};
use burn::prelude::*;
use std::sync::{Mutex, PoisonError};

use crate::domain::record::Prediction;
use crate::domain::traits::SentimentPredictor;
use crate::infra::artifact::{ArtifactStore, ModelArtifact, PreprocessingContract};
use crate::infra::vectorizer::Vectorizer;
use crate::ml::{model::SentimentModel, InferBackend};

pub struct Inferencer {
    model:      Mutex<SentimentModel<InferBackend>>,
    vectorizer: Vectorizer,
    contract:   PreprocessingContract,
    device:     <InferBackend as Backend>::Device,
}

impl Inferencer {
    /// Load the artifact from `store` and rebuild model and vectorizer.
    pub fn from_store(store: &ArtifactStore) -> Result<Self> {
        let artifact = store.load()?;
        Self::from_artifact(&artifact)
    }

    pub fn from_artifact(artifact: &ModelArtifact) -> Result<Self> {
        let device = <InferBackend as Backend>::Device::default();
        let vectorizer = artifact.vectorizer()?;
        let model: SentimentModel<InferBackend> = artifact.model(&device)?;
        tracing::info!(
            "Inferencer ready (template={:?}, sequence_length={}, vocab_size={})",
            artifact.header.preprocessing.prompt_template,
            artifact.header.preprocessing.sequence_length,
            vectorizer.vocab_size()
        );
        Ok(Self::from_parts(model, vectorizer, artifact.header.preprocessing.clone(), device))
    }

    /// Assemble an inferencer from an in-memory model.
    pub fn from_parts(
        model:      SentimentModel<InferBackend>,
        vectorizer: Vectorizer,
        contract:   PreprocessingContract,
        device:     <InferBackend as Backend>::Device,
    ) -> Self {
        Self { model: Mutex::new(model), vectorizer, contract, device }
    }

    /// Classify the sentiment expressed about `entity` in `text`.
    pub fn predict(&self, entity: &str, text: &str) -> Result<Prediction> {
        let input = self.contract.prompt_template.render(entity, text);
        let ids = self.vectorizer.encode(&input)?;
        let seq_len = ids.len();

        let flat: Vec<i32> = ids.iter().map(|&id| id as i32).collect();
        let input_tensor = Tensor::<InferBackend, 1, Int>::from_ints(flat.as_slice(), &self.device)
            .reshape([1, seq_len]);

        let probs = {
            // The model is never mutated, so a panic in another request
            // cannot leave it half-updated; keep serving after poisoning.
            let model = self.model.lock().unwrap_or_else(PoisonError::into_inner);
            model.probabilities(input_tensor)
        };
        let probs: Vec<f32> = probs
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| anyhow::anyhow!("{e:?}"))
            .context("Cannot read model output")?;

        let prediction = Prediction::from_probabilities(&probs)?;
        tracing::debug!(
            "entity='{}' → {} ({:.4}) probabilities={:?}",
            entity,
            prediction.class,
            prediction.confidence,
            prediction.probabilities
        );
        Ok(prediction)
    }
}

impl SentimentPredictor for Inferencer {
    fn predict(&self, entity: &str, text: &str) -> Result<Prediction> {
        Inferencer::predict(self, entity, text)
    }
}
