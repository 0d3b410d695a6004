// ============================================================
// Layer 2 - ServeUseCase
// ============================================================
//   Step 1: Load the artifact into an Inferencer (fails fast,
//           before any socket is bound)
//   Step 2: Build the router around Arc<dyn SentimentPredictor>
//   Step 3: Serve on tokio until Ctrl-C
//
// The CLI stays synchronous; this use case owns its runtime.

use anyhow::{bail, Context, Result};
use std::{path::PathBuf, sync::Arc};

use crate::api;
use crate::domain::traits::SentimentPredictor;
use crate::infra::artifact::{ArtifactStore, DEFAULT_MODEL_PATH};
use crate::ml::inferencer::Inferencer;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host:       String,
    pub port:       u16,
    pub model_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host:       "0.0.0.0".to_string(),
            port:       8000,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("SENTIMENT_HOST") {
            config.host = host;
        }

        if let Ok(port_str) = std::env::var("SENTIMENT_PORT") {
            match port_str.parse::<u16>() {
                Ok(port) => config.port = port,
                Err(_) => tracing::warn!("Ignoring invalid SENTIMENT_PORT '{}'", port_str),
            }
        }

        if let Ok(path) = std::env::var("MODEL_PATH") {
            config.model_path = PathBuf::from(path);
        }

        config
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            bail!("host cannot be empty");
        }
        Ok(())
    }
}

pub struct ServeUseCase {
    config: ServerConfig,
}

impl ServeUseCase {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<()> {
        self.config.validate()?;

        let inferencer = Inferencer::from_store(&ArtifactStore::new(&self.config.model_path))
            .context("Model could not be loaded")?;
        let predictor: Arc<dyn SentimentPredictor> = Arc::new(inferencer);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("Cannot start the async runtime")?;
        runtime.block_on(serve(predictor, self.config.server_address()))
    }
}

async fn serve(predictor: Arc<dyn SentimentPredictor>, address: String) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Cannot bind {address}"))?;
    tracing::info!("Sentiment API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, api::router(predictor))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => tracing::error!("Cannot listen for Ctrl-C: {}", e),
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::artifact::ArtifactError;

    #[test]
    fn test_defaults() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.server_address(), "0.0.0.0:8000");
        assert_eq!(cfg.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
    }

    #[test]
    fn test_missing_artifact_aborts_startup() {
        let cfg = ServerConfig {
            port:       0,
            model_path: PathBuf::from("/definitely/not/here/model.bin"),
            ..ServerConfig::default()
        };
        let err = ServeUseCase::new(cfg).execute().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ArtifactError>(),
            Some(ArtifactError::NotFound { .. })
        ));
    }

    #[test]
    fn test_empty_host_is_invalid() {
        let cfg = ServerConfig { host: String::new(), ..ServerConfig::default() };
        assert!(cfg.validate().is_err());
    }
}
