// ============================================================
// Layer 1 - CLI Commands and Arguments
// ============================================================
// Defines the four subcommands and their flags:
//
//   fetch-dataset  train  serve  predict
//
// Flags that can also come from the environment (or the .env
// file loaded at startup) say so in their help text.
//
// Reference: Rust Book §12 (Building a CLI Program)

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::{
    fetch_use_case::FetchConfig, serve_use_case::ServerConfig, train_use_case::TrainConfig,
};
use crate::data::loader::UnknownLabelPolicy;
use crate::infra::artifact::DEFAULT_MODEL_PATH;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download the Twitter entity sentiment dataset from Kaggle
    FetchDataset(FetchArgs),

    /// Train the classifier and write the model artifact
    Train(TrainArgs),

    /// Serve predictions over HTTP
    Serve(ServeArgs),

    /// Classify one (entity, text) pair locally
    Predict(PredictArgs),
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Write DATA_FOLDER to a .env file after download
    #[arg(long)]
    pub set_env: bool,

    /// Path to the .env file to create/update
    #[arg(long, default_value = ".env")]
    pub env_file: PathBuf,

    /// Overwrite DATA_FOLDER in the .env file if it already exists
    #[arg(long)]
    pub overwrite: bool,

    /// Cache root (defaults to $KAGGLEHUB_CACHE or ~/.cache/kagglehub)
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Download again even if the cache already holds the dataset
    #[arg(long)]
    pub force_download: bool,
}

impl From<&FetchArgs> for FetchConfig {
    fn from(a: &FetchArgs) -> Self {
        FetchConfig {
            set_env:   a.set_env,
            env_file:  a.env_file.clone(),
            overwrite: a.overwrite,
        }
    }
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Folder holding twitter_training.csv and twitter_validation.csv
    #[arg(long, env = "DATA_FOLDER")]
    pub data_folder: Option<PathBuf>,

    /// Where the trained artifact is written
    #[arg(long, default_value = DEFAULT_MODEL_PATH)]
    pub model_path: PathBuf,

    /// Maximum number of passes over the training set
    #[arg(long, default_value_t = 6)]
    pub epochs: usize,

    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Tokens per input; longer inputs are truncated, shorter padded
    #[arg(long, default_value_t = 64)]
    pub sequence_length: usize,

    #[arg(long, default_value_t = 64)]
    pub embedding_dim: usize,

    #[arg(long, default_value_t = 64)]
    pub hidden_dim: usize,

    #[arg(long, default_value_t = 0.3)]
    pub dropout: f64,

    /// Cap on vocabulary size, including [PAD] and [UNK]
    #[arg(long)]
    pub max_tokens: Option<usize>,

    /// Epochs without validation improvement before stopping
    #[arg(long, default_value_t = 0)]
    pub patience: usize,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// What to do with rows whose sentiment label is unknown
    #[arg(long, value_enum, default_value_t = UnknownLabelPolicy::Drop)]
    pub label_policy: UnknownLabelPolicy,
}

/// The application layer never sees clap types.
impl TryFrom<TrainArgs> for TrainConfig {
    type Error = anyhow::Error;

    fn try_from(a: TrainArgs) -> Result<Self> {
        let Some(data_folder) = a.data_folder else {
            bail!("DATA_FOLDER environment variable is not set in the .env file.");
        };
        Ok(TrainConfig {
            data_folder,
            model_path:      a.model_path,
            epochs:          a.epochs,
            batch_size:      a.batch_size,
            lr:              a.lr,
            sequence_length: a.sequence_length,
            embedding_dim:   a.embedding_dim,
            hidden_dim:      a.hidden_dim,
            dropout:         a.dropout,
            max_tokens:      a.max_tokens,
            patience:        a.patience,
            seed:            a.seed,
            label_policy:    a.label_policy,
        })
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Bind address (env SENTIMENT_HOST, default 0.0.0.0)
    #[arg(long)]
    pub host: Option<String>,

    /// Port (env SENTIMENT_PORT, default 8000)
    #[arg(long)]
    pub port: Option<u16>,

    /// Artifact to serve (env MODEL_PATH)
    #[arg(long)]
    pub model_path: Option<PathBuf>,
}

impl ServeArgs {
    /// Flags override the environment, which overrides the defaults.
    pub fn into_config(self, base: ServerConfig) -> ServerConfig {
        ServerConfig {
            host:       self.host.unwrap_or(base.host),
            port:       self.port.unwrap_or(base.port),
            model_path: self.model_path.unwrap_or(base.model_path),
        }
    }
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// The entity the sentiment is about
    #[arg(long)]
    pub entity: String,

    /// The text mentioning the entity
    #[arg(long)]
    pub text: String,

    #[arg(long, env = "MODEL_PATH", default_value = DEFAULT_MODEL_PATH)]
    pub model_path: PathBuf,
}
