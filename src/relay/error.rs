//! Relay error type and its HTTP mapping
//!
//! Request validation failures are returned to the caller verbatim. Upstream
//! failures are logged with full detail, and the caller only sees
//! `{"error": "Internal server error"}`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Errors produced while serving a relay request
#[derive(Debug, Error)]
pub enum RelayError {
    /// The request body is missing a required field or is malformed
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The chat-completion provider failed
    #[error("upstream error: {0}")]
    Upstream(#[from] anyhow::Error),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, client_message) = match &self {
            RelayError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            RelayError::Upstream(e) => {
                tracing::error!(error = ?e, "Upstream completion failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": client_message }))).into_response()
    }
}

impl From<JsonRejection> for RelayError {
    fn from(rejection: JsonRejection) -> Self {
        RelayError::BadRequest(rejection.body_text())
    }
}
