// ============================================================
// Layer 2 - FetchDatasetUseCase
// ============================================================
//   Step 1: Fetch the dataset           (DatasetSource)
//   Step 2: Verify the required files   (infra::kaggle)
//   Step 3: Optionally record DATA_FOLDER in a .env file

use anyhow::{bail, Context, Result};
use std::path::PathBuf;

use crate::domain::traits::DatasetSource;
use crate::infra::{env_file::EnvFile, kaggle::verify_dataset_folder};

/// Variable the train command reads the dataset location from
pub const DATA_FOLDER_VAR: &str = "DATA_FOLDER";

#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Write DATA_FOLDER into `env_file` after a successful fetch
    pub set_env:   bool,
    pub env_file:  PathBuf,
    pub overwrite: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { set_env: false, env_file: PathBuf::from(".env"), overwrite: false }
    }
}

/// What happened, for the CLI to report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub dataset_path: PathBuf,
    /// Absolute path of the .env file that was updated, if any
    pub env_file:     Option<PathBuf>,
}

pub struct FetchDatasetUseCase<S: DatasetSource> {
    source: S,
    config: FetchConfig,
}

impl<S: DatasetSource> FetchDatasetUseCase<S> {
    pub fn new(source: S, config: FetchConfig) -> Self {
        Self { source, config }
    }

    pub fn execute(&self) -> Result<FetchOutcome> {
        tracing::info!("Fetching dataset {}", self.source.describe());
        let dataset_path = self
            .source
            .fetch()
            .with_context(|| format!("Failed to download {}", self.source.describe()))?;
        tracing::info!("Dataset available at '{}'", dataset_path.display());

        let missing = verify_dataset_folder(&dataset_path);
        if !missing.is_empty() {
            bail!(
                "The downloaded folder is missing expected files: {}.\nChecked folder: {}",
                missing.join(", "),
                dataset_path.display()
            );
        }

        let env_file = if self.config.set_env {
            let path = if self.config.env_file.is_absolute() {
                self.config.env_file.clone()
            } else {
                std::env::current_dir()
                    .context("Cannot determine the working directory")?
                    .join(&self.config.env_file)
            };
            EnvFile::new(&path).set(
                DATA_FOLDER_VAR,
                &dataset_path.to_string_lossy(),
                self.config.overwrite,
            )?;
            Some(path)
        } else {
            None
        };

        Ok(FetchOutcome { dataset_path, env_file })
    }
}
