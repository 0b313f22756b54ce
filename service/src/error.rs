//! API error taxonomy and HTTP rendering.
//!
//! Every error renders as a JSON envelope `{"status":"error","error":...}`.
//! Backend failures (store, decode, document store) log with full detail
//! and render as a generic 500 so internals never reach clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::repo::docs::DocError;
use crate::store::attr::DecodeError;
use crate::store::StoreError;

/// Errors surfaced by route handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Entity lookup came back empty. Renders as 400 with
    /// `"<Entity> not found."`, the contract clients already parse.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Request parameters failed validation.
    #[error("invalid request: {0}")]
    Validation(String),

    /// Missing, malformed, expired or wrong-key credentials. The message
    /// is one of a small fixed set so the response does not reveal which
    /// check failed.
    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),

    /// A uniqueness constraint was hit (duplicate account or follow).
    #[error("conflict: {0}")]
    Conflict(&'static str),

    /// Internal invariant failure (hashing, serialization).
    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Doc(#[from] DocError),
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::NotFound(entity) => {
                (StatusCode::BAD_REQUEST, format!("{entity} not found."))
            }
            Self::Validation(message) => (StatusCode::BAD_REQUEST, message.clone()),
            Self::Unauthorized(message) => (StatusCode::UNAUTHORIZED, (*message).to_string()),
            Self::Conflict(message) => (StatusCode::CONFLICT, (*message).to_string()),
            Self::Internal(_) | Self::Store(_) | Self::Decode(_) | Self::Doc(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if matches!(
            self,
            Self::Internal(_) | Self::Store(_) | Self::Decode(_) | Self::Doc(_)
        ) {
            tracing::error!(error = %self, "request failed on a backend error");
        }
        let (status, message) = self.status_and_message();
        let body = Json(json!({ "status": "error", "error": message }));
        (status, body).into_response()
    }
}
