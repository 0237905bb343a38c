//! API error taxonomy and the uniform response constructor
//!
//! Client-facing bodies are always `{"error": <public message>}`.
//! Internal detail (upstream payloads, database errors, configuration
//! problems) is logged server-side and never serialized into a
//! response body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or invalid input (400); the message is client-safe
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Missing or unverifiable credential (401)
    #[error("Unauthorized")]
    Unauthorized,

    /// Resource not found (404); the resource name is client-safe
    #[error("{0} not found")]
    NotFound(String),

    /// Rate limit exceeded (429)
    #[error("Too many requests")]
    TooManyRequests,

    /// Internal failure (500); the detail is logged, never returned
    #[error("Internal server error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),

    /// plantarium-common error
    #[error("{0}")]
    Common(#[from] plantarium_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, public_message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::NotFound(resource) => {
                (StatusCode::NOT_FOUND, format!("{} not found", resource))
            }
            ApiError::TooManyRequests => (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests. Please try again later.".to_string(),
            ),
            ApiError::Internal(_)
            | ApiError::Io(_)
            | ApiError::Database(_)
            | ApiError::Other(_)
            | ApiError::Common(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An error occurred".to_string(),
            ),
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "API request failed");
        } else {
            tracing::debug!(status = %status, error = %self, "API request rejected");
        }

        (status, Json(json!({ "error": public_message }))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
