// ============================================================
// Layer 1 - HTTP Error Responses
// ============================================================
// Every error leaves the API as {"detail": "..."}:
//
//   Rejected    - the body could not be extracted; the client
//                 sees the extractor's status and reason
//   Internal    - anything after extraction; logged here, the
//                 client only sees a generic 500

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

pub const INTERNAL_ERROR_DETAIL: &str = "Internal server error.";

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{detail}")]
    Rejected { status: StatusCode, detail: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::Rejected { status, detail } => {
                tracing::debug!("Rejected request ({}): {}", status, detail);
                (status, detail)
            }
            ApiError::Internal(err) => {
                tracing::error!("Internal server error: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_DETAIL.to_string())
            }
        };
        (status, Json(ErrorBody { detail })).into_response()
    }
}
