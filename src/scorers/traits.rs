use async_trait::async_trait;
use thiserror::Error;

use crate::sentiment::ScoreVector;

#[derive(Debug, Error)]
pub enum ScorerError {
    #[error("scorer timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    #[error("scorer unavailable: {0}")]
    Unavailable(String),
    #[error("request error: {0}")]
    Request(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("invalid scores: {0}")]
    InvalidScores(String),
    #[error("model error: {0}")]
    Model(String),
}

impl From<anyhow::Error> for ScorerError {
    fn from(err: anyhow::Error) -> Self {
        ScorerError::Request(format!("{err:#}"))
    }
}

impl From<candle_core::Error> for ScorerError {
    fn from(err: candle_core::Error) -> Self {
        ScorerError::Model(err.to_string())
    }
}

/// Turns one chunk of text into per-class scores.
///
/// Implementations may be probabilistic and are not required to normalise their output.
#[async_trait]
pub trait ChunkScorer: Send + Sync {
    async fn score(&self, chunk: &str) -> Result<ScoreVector, ScorerError>;

    /// Short backend name for logs and `/info`.
    fn name(&self) -> &str;
}
