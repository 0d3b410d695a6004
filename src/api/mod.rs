// ============================================================
// Layer 1 - HTTP API (axum)
// ============================================================
// The router only knows the SentimentPredictor trait. The serve
// use case injects the loaded Inferencer; tests inject mocks.
//
//   handlers.rs - health and predict endpoints
//   error.rs    - ApiError → {"detail": ...} responses

pub mod error;
pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::domain::traits::SentimentPredictor;

#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<dyn SentimentPredictor>,
}

/// Build the application router around a predictor.
pub fn router(predictor: Arc<dyn SentimentPredictor>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/isalive", get(handlers::health))
        .route("/predict", post(handlers::predict))
        .with_state(AppState { predictor })
}
