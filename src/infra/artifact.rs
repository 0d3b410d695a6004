// ============================================================
// Layer 6 - Model Artifact Store
// ============================================================
// Persists everything serving needs in ONE file:
//
//   ModelArtifact
//     ├── header
//     │     ├── format_version         (this file layout)
//     │     ├── preprocessing          (prompt template, standardizer
//     │     │                           version, sequence length)
//     │     ├── model                  (SentimentModelConfig)
//     │     ├── class_labels
//     │     └── best_epoch / val_accuracy
//     ├── tokenizer_json               (fitted vocabulary)
//     └── weights                      (Burn BinBytesRecorder bytes)
//
// The whole struct is encoded with bincode. Writes go to a
// temporary sibling first and are renamed into place, so a
// reader never observes a half-written artifact.
//
// Loading refuses artifacts whose format or standardizer version
// this build does not know, instead of silently serving with a
// mismatched preprocessing pipeline.
//
// Reference: Burn Book §5 (Records)

use anyhow::{bail, Context, Result};
use burn::{
    prelude::*,
    record::{BinBytesRecorder, FullPrecisionSettings, Recorder},
};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::data::preprocessor::STANDARDIZER_VERSION;
use crate::domain::prompt::PromptTemplate;
use crate::domain::sentiment::{class_to_label, NUM_CLASSES};
use crate::infra::vectorizer::Vectorizer;
use crate::ml::model::{SentimentModel, SentimentModelConfig, SentimentModelRecord};

/// Layout version of the artifact file
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Default artifact location, relative to the working directory
pub const DEFAULT_MODEL_PATH: &str = "models/full_model_1D.bin";

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("artifact '{path}' not found. Have you run 'train' first?")]
    NotFound { path: PathBuf },

    #[error("artifact format version {found} is not supported (expected {expected})")]
    UnsupportedFormat { found: u32, expected: u32 },

    #[error("artifact was trained with text standardizer v{found}, this build implements v{expected}")]
    StandardizerMismatch { found: u32, expected: u32 },

    #[error("artifact has {found} classes, this build predicts {expected}")]
    ClassCountMismatch { found: usize, expected: usize },
}

/// Everything that must happen to a raw (entity, text) pair before
/// it reaches the model. Recorded at training time, replayed at serving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreprocessingContract {
    pub prompt_template:      PromptTemplate,
    pub standardizer_version: u32,
    pub sequence_length:      usize,
}

impl PreprocessingContract {
    /// The contract implemented by the current build
    pub fn current(sequence_length: usize) -> Self {
        Self {
            prompt_template:      PromptTemplate::CURRENT,
            standardizer_version: STANDARDIZER_VERSION,
            sequence_length,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactHeader {
    pub format_version: u32,
    pub preprocessing:  PreprocessingContract,
    pub model:          SentimentModelConfig,
    /// Label reported for each class index
    pub class_labels:   Vec<String>,
    /// Epoch whose weights are stored (1-based)
    pub best_epoch:     usize,
    pub val_accuracy:   f64,
}

impl ArtifactHeader {
    pub fn new(
        preprocessing: PreprocessingContract,
        model:         SentimentModelConfig,
        best_epoch:    usize,
        val_accuracy:  f64,
    ) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            preprocessing,
            model,
            class_labels: (0..NUM_CLASSES)
                .filter_map(class_to_label)
                .map(|label| label.as_str().to_string())
                .collect(),
            best_epoch,
            val_accuracy,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub header:         ArtifactHeader,
    pub tokenizer_json: String,
    pub weights:        Vec<u8>,
}

impl ModelArtifact {
    /// Encode a model and its vectorizer into an artifact.
    pub fn from_model<B: Backend>(
        header:     ArtifactHeader,
        vectorizer: &Vectorizer,
        model:      &SentimentModel<B>,
    ) -> Result<Self> {
        if vectorizer.sequence_length() != header.preprocessing.sequence_length {
            bail!(
                "vectorizer pads to {} tokens but the artifact records {}",
                vectorizer.sequence_length(),
                header.preprocessing.sequence_length
            );
        }
        let weights = BinBytesRecorder::<FullPrecisionSettings>::default()
            .record(model.clone().into_record(), ())
            .map_err(|e| anyhow::anyhow!("Cannot encode model weights: {e}"))?;

        Ok(Self {
            header,
            tokenizer_json: vectorizer.to_json()?,
            weights,
        })
    }

    /// Rebuild the vectorizer recorded in this artifact.
    pub fn vectorizer(&self) -> Result<Vectorizer> {
        Vectorizer::from_json(&self.tokenizer_json, self.header.preprocessing.sequence_length)
    }

    /// Rebuild the model on `device` and load the stored weights into it.
    pub fn model<B: Backend>(&self, device: &B::Device) -> Result<SentimentModel<B>> {
        let model: SentimentModel<B> = self.header.model.init(device);
        let record: SentimentModelRecord<B> = BinBytesRecorder::<FullPrecisionSettings>::default()
            .load(self.weights.clone(), device)
            .map_err(|e| anyhow::anyhow!("Cannot decode model weights: {e}"))?;
        Ok(model.load_record(record))
    }

    /// Check that this build can replay the artifact's preprocessing.
    pub fn validate(&self) -> std::result::Result<(), ArtifactError> {
        if self.header.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ArtifactError::UnsupportedFormat {
                found:    self.header.format_version,
                expected: ARTIFACT_FORMAT_VERSION,
            });
        }
        if self.header.preprocessing.standardizer_version != STANDARDIZER_VERSION {
            return Err(ArtifactError::StandardizerMismatch {
                found:    self.header.preprocessing.standardizer_version,
                expected: STANDARDIZER_VERSION,
            });
        }
        for found in [self.header.class_labels.len(), self.header.model.num_classes] {
            if found != NUM_CLASSES {
                return Err(ArtifactError::ClassCountMismatch { found, expected: NUM_CLASSES });
            }
        }
        Ok(())
    }
}

/// Reads and writes the artifact file at a fixed path.
pub struct ArtifactStore {
    path: PathBuf,
}

impl ArtifactStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the artifact (used for side files like metrics)
    pub fn dir(&self) -> PathBuf {
        self.path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Write the artifact atomically (temp file + rename).
    pub fn save(&self, artifact: &ModelArtifact) -> Result<()> {
        let dir = self.dir();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create model directory '{}'", dir.display()))?;

        let tmp_path = self.path.with_extension("tmp");
        {
            let file = fs::File::create(&tmp_path)
                .with_context(|| format!("Cannot create '{}'", tmp_path.display()))?;
            let mut writer = BufWriter::new(file);
            bincode::serialize_into(&mut writer, artifact)
                .with_context(|| format!("Cannot encode artifact to '{}'", tmp_path.display()))?;
            writer.flush()?;
        }
        fs::rename(&tmp_path, &self.path).with_context(|| {
            format!("Cannot move '{}' to '{}'", tmp_path.display(), self.path.display())
        })?;

        tracing::debug!(
            "Saved artifact '{}' (epoch {}, val_accuracy={:.4})",
            self.path.display(),
            artifact.header.best_epoch,
            artifact.header.val_accuracy
        );
        Ok(())
    }

    /// Read and validate the artifact.
    pub fn load(&self) -> Result<ModelArtifact> {
        if !self.path.exists() {
            return Err(ArtifactError::NotFound { path: self.path.clone() }.into());
        }

        let file = fs::File::open(&self.path)
            .with_context(|| format!("Cannot open artifact '{}'", self.path.display()))?;
        let artifact: ModelArtifact = bincode::deserialize_from(BufReader::new(file))
            .with_context(|| format!("Cannot decode artifact '{}'", self.path.display()))?;

        artifact.validate()?;
        tracing::info!(
            "Loaded artifact '{}' (epoch {}, val_accuracy={:.4}, vocab_size={})",
            self.path.display(),
            artifact.header.best_epoch,
            artifact.header.val_accuracy,
            artifact.header.model.vocab_size
        );
        Ok(artifact)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("entity-sentiment-artifact-{}-{name}", std::process::id()))
            .join("model.bin")
    }

    fn build() -> (Vectorizer, SentimentModel<TestBackend>, ArtifactHeader) {
        let texts = vec!["great phone".to_string(), "awful battery".to_string()];
        let vectorizer = Vectorizer::fit(&texts, None, 8).unwrap();
        let cfg = SentimentModelConfig::new(vectorizer.vocab_size(), 4, 4, 3, 0.0);
        let model = cfg.init::<TestBackend>(&Default::default());
        let header = ArtifactHeader::new(PreprocessingContract::current(8), cfg, 3, 0.75);
        (vectorizer, model, header)
    }

    #[test]
    fn test_save_load_round_trip() {
        let (vectorizer, model, header) = build();
        let store = ArtifactStore::new(temp_path("roundtrip"));

        let artifact = ModelArtifact::from_model(header, &vectorizer, &model).unwrap();
        store.save(&artifact).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded.header.best_epoch, 3);
        assert_eq!(loaded.header.preprocessing, PreprocessingContract::current(8));
        assert_eq!(loaded.header.class_labels, vec!["Negative", "Neutral", "Positive"]);

        let restored_vec = loaded.vectorizer().unwrap();
        assert_eq!(
            restored_vec.encode("great battery").unwrap(),
            vectorizer.encode("great battery").unwrap()
        );

        let device = Default::default();
        let restored: SentimentModel<TestBackend> = loaded.model(&device).unwrap();
        let ids = Tensor::<TestBackend, 1, Int>::from_ints([2, 3, 0, 0], &device).reshape([1, 4]);
        let a: Vec<f32> = model.forward(ids.clone()).into_data().to_vec::<f32>().unwrap();
        let b: Vec<f32> = restored.forward(ids).into_data().to_vec::<f32>().unwrap();
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-6);
        }

        fs::remove_dir_all(store.dir()).unwrap();
    }

    #[test]
    fn test_missing_artifact_is_not_found() {
        let store = ArtifactStore::new(temp_path("missing"));
        let err = store.load().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ArtifactError>(),
            Some(ArtifactError::NotFound { .. })
        ));
    }

    #[test]
    fn test_unknown_versions_are_rejected() {
        let (vectorizer, model, header) = build();
        let mut artifact = ModelArtifact::from_model(header, &vectorizer, &model).unwrap();

        artifact.header.preprocessing.standardizer_version = STANDARDIZER_VERSION + 1;
        assert!(matches!(
            artifact.validate(),
            Err(ArtifactError::StandardizerMismatch { .. })
        ));

        artifact.header.format_version = ARTIFACT_FORMAT_VERSION + 1;
        assert!(matches!(
            artifact.validate(),
            Err(ArtifactError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_class_count_must_match() {
        let (vectorizer, model, header) = build();
        let mut artifact = ModelArtifact::from_model(header, &vectorizer, &model).unwrap();
        artifact.header.class_labels.push("Irrelevant".to_string());
        assert!(matches!(
            artifact.validate(),
            Err(ArtifactError::ClassCountMismatch { found: 4, expected: 3 })
        ));
    }

    #[test]
    fn test_sequence_length_must_match_vectorizer() {
        let (vectorizer, model, mut header) = build();
        header.preprocessing.sequence_length = 16;
        assert!(ModelArtifact::from_model(header, &vectorizer, &model).is_err());
    }

    #[test]
    fn test_dir_of_bare_file_name_is_cwd() {
        assert_eq!(ArtifactStore::new("model.bin").dir(), PathBuf::from("."));
        assert_eq!(ArtifactStore::new("models/a.bin").dir(), PathBuf::from("models"));
    }
}
