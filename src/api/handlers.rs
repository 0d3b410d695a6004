// ============================================================
// Layer 1 - HTTP Handlers
// ============================================================
//   GET  /health, /isalive  → fixed liveness payload
//   POST /predict           → {entity, predicted_class, confidence}
//
// The forward pass is CPU-bound, so it runs on tokio's blocking
// pool rather than on an async worker.

use anyhow::anyhow;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::{error::ApiError, AppState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub health_check: String,
    pub message:      String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictRequest {
    pub entity: String,
    pub text:   String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub entity:          String,
    pub predicted_class: String,
    pub confidence:      f32,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        health_check: "OK".to_string(),
        message:      "NLP sentiment analysis API".to_string(),
    })
}

pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(request) = payload?;

    let predictor = state.predictor.clone();
    let PredictRequest { entity, text } = request;
    let (entity, prediction) = tokio::task::spawn_blocking(move || {
        let prediction = predictor.predict(&entity, &text);
        (entity, prediction)
    })
    .await
    .map_err(|e| anyhow!("prediction task failed: {e}"))?;
    let prediction = prediction?;

    Ok(Json(PredictResponse {
        entity,
        predicted_class: prediction.class.label().to_string(),
        confidence:      prediction.confidence,
    }))
}
