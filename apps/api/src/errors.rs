use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::preprocess::PreprocessingError;
use crate::review::ReviewError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// Rejected document. Carries its own wire code (`NO_CONTENT`, `TOO_SHORT`, ...).
    #[error(transparent)]
    Preprocessing(#[from] PreprocessingError),

    #[error("Rate limit exceeded; retry in {reset_in_ms}ms")]
    RateLimited { reset_in_ms: u64 },

    #[error("{0}")]
    Timeout(String),

    #[error("{0}")]
    AiUnavailable(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ReviewError> for AppError {
    fn from(err: ReviewError) -> Self {
        match err {
            ReviewError::Input(e) => AppError::Preprocessing(e),
            ref failed if failed.is_timeout() => AppError::Timeout(format!(
                "{failed}. Try again, or pick a faster model."
            )),
            ref failed if failed.is_unavailable() => AppError::AiUnavailable(failed.to_string()),
            failed => AppError::Llm(failed.to_string()),
        }
    }
}

impl AppError {
    /// Status and JSON body. Shared by the JSON responses and the SSE `error` event.
    pub fn status_and_body(&self) -> (StatusCode, Value) {
        let (status, code, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Preprocessing(e) => (StatusCode::BAD_REQUEST, e.code(), e.to_string()),
            AppError::RateLimited { reset_in_ms } => {
                let body = json!({
                    "error": {
                        "code": "RATE_LIMITED",
                        "message": self.to_string(),
                        "resetIn": reset_in_ms
                    }
                });
                return (StatusCode::TOO_MANY_REQUESTS, body);
            }
            AppError::Timeout(msg) => {
                tracing::error!("Analysis timed out: {msg}");
                (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT", msg.clone())
            }
            AppError::AiUnavailable(msg) => {
                tracing::error!("AI provider unavailable: {msg}");
                (StatusCode::SERVICE_UNAVAILABLE, "AI_UNAVAILABLE", msg.clone())
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (StatusCode::BAD_GATEWAY, "LLM_ERROR", msg.clone())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": {
                "code": code,
                "message": message
            }
        });
        (status, body)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}
