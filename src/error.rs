//! Domain-specific error types for journal-sentiment

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::scorers::ScorerError;

/// Main error type for the sentiment service
#[derive(Error, Debug)]
pub enum SentimentError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Scorer error: {0}")]
    Scorer(#[from] ScorerError),

    #[error("Insight error: {message}")]
    Insight { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("Timeout error: {operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<anyhow::Error> for SentimentError {
    fn from(err: anyhow::Error) -> Self {
        SentimentError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for SentimentError {
    fn from(err: serde_json::Error) -> Self {
        SentimentError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for SentimentError {
    fn from(err: toml::de::Error) -> Self {
        SentimentError::Config {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for SentimentError {
    fn from(err: std::io::Error) -> Self {
        SentimentError::Internal {
            message: format!("I/O error: {}", err),
        }
    }
}

impl SentimentError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SentimentError::Validation { .. } => StatusCode::BAD_REQUEST,
            SentimentError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            SentimentError::Scorer(_) | SentimentError::Insight { .. } => StatusCode::BAD_GATEWAY,
            SentimentError::Config { .. }
            | SentimentError::Serialization { .. }
            | SentimentError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Convert SentimentError to an HTTP JSON error body
impl IntoResponse for SentimentError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // validation messages are user-facing as-is
        let message = match self {
            SentimentError::Validation { message } => message,
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for sentiment operations
pub type Result<T> = std::result::Result<T, SentimentError>;
