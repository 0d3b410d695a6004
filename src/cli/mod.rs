// ============================================================
// Layer 1 - CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction. clap parses the
// arguments; every command is delegated to a Layer 2 use case.
//
//   fetch-dataset - download + verify, optionally set DATA_FOLDER
//   train         - train and write the artifact
//   serve         - HTTP API over the artifact
//   predict       - one local prediction, printed as JSON
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, FetchArgs, PredictArgs, ServeArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "entity-sentiment",
    version,
    about = "Train and serve an entity-targeted sentiment classifier."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Route the subcommand to its use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::FetchDataset(args) => run_fetch(args),
            Commands::Train(args)        => run_train(args),
            Commands::Serve(args)        => run_serve(args),
            Commands::Predict(args)      => run_predict(args),
        }
    }
}

fn run_fetch(args: FetchArgs) -> Result<()> {
    use crate::application::fetch_use_case::{FetchDatasetUseCase, DATA_FOLDER_VAR};
    use crate::infra::kaggle::{KaggleDataset, DATASET_ID};

    let mut source = KaggleDataset::new(DATASET_ID)?.with_force_download(args.force_download);
    if let Some(dir) = &args.cache_dir {
        source = source.with_cache_root(dir);
    }

    let outcome = FetchDatasetUseCase::new(source, (&args).into()).execute()?;
    println!("Dataset downloaded to: {}", outcome.dataset_path.display());

    match outcome.env_file {
        Some(env_file) => println!(
            "Updated {} with {}=\"{}\"",
            env_file.display(),
            DATA_FOLDER_VAR,
            outcome.dataset_path.display()
        ),
        None => println!(
            "Set {DATA_FOLDER_VAR} in your .env to the path above \
             (it contains twitter_training.csv and twitter_validation.csv)."
        ),
    }
    Ok(())
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    let config = args.try_into()?;
    let summary = TrainUseCase::new(config).execute()?;

    println!(
        "Training complete. Best epoch {} with val_accuracy {:.4}{}.",
        summary.best_epoch,
        summary.best_val_accuracy,
        if summary.stopped_early { " (stopped early)" } else { "" }
    );
    Ok(())
}

fn run_serve(args: ServeArgs) -> Result<()> {
    use crate::application::serve_use_case::{ServeUseCase, ServerConfig};

    let config = args.into_config(ServerConfig::from_env_or_default());
    tracing::info!("Starting server on {}", config.server_address());
    ServeUseCase::new(config).execute()
}

fn run_predict(args: PredictArgs) -> Result<()> {
    use crate::api::handlers::PredictResponse;
    use crate::infra::artifact::ArtifactStore;
    use crate::ml::inferencer::Inferencer;

    let inferencer = Inferencer::from_store(&ArtifactStore::new(&args.model_path))?;
    let prediction = inferencer.predict(&args.entity, &args.text)?;

    let response = PredictResponse {
        entity:          args.entity,
        predicted_class: prediction.class.label().to_string(),
        confidence:      prediction.confidence,
    };
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
