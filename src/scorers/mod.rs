//! Pluggable chunk scorers and backend selection.

pub mod groq;
pub mod lexicon;
pub mod local;
pub mod traits;

use std::sync::Arc;
use tracing::info;

pub use groq::GroqScorer;
pub use lexicon::LexiconScorer;
pub use local::LocalScorer;
pub use traits::{ChunkScorer, ScorerError};

use crate::config::Config;
use crate::error::{Result, SentimentError};

/// Build the scorer named by `analysis.scorer`.
///
/// The local model is loaded (and downloaded if needed) on a blocking thread.
pub async fn create_scorer(config: &Config) -> Result<Arc<dyn ChunkScorer>> {
    match config.analysis.scorer.as_str() {
        "groq" => {
            let scorer = GroqScorer::new(&config.groq, config.runtime.groq_api_key.clone())?;
            info!(
                "Using Groq sentiment scorer (model={})",
                config.groq.sentiment_model
            );
            Ok(Arc::new(scorer))
        }
        "local" => {
            let local = config.local.clone();
            let scorer = tokio::task::spawn_blocking(move || LocalScorer::new(&local))
                .await
                .map_err(|e| SentimentError::Internal {
                    message: format!("model loading task failed: {}", e),
                })?
                .map_err(|e| ScorerError::Unavailable(format!("{e:#}")))?;
            info!("Using local sentiment scorer (model={})", scorer.model_id());
            Ok(Arc::new(scorer))
        }
        "lexicon" => {
            info!("Using lexicon sentiment scorer (deterministic, offline)");
            Ok(Arc::new(LexiconScorer::new()))
        }
        other => Err(SentimentError::Config {
            message: format!("unknown scorer '{}'", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builds_lexicon_scorer() {
        let mut config = Config::default();
        config.analysis.scorer = "lexicon".to_string();
        let scorer = create_scorer(&config).await.unwrap();
        assert_eq!(scorer.name(), "lexicon");
    }

    #[tokio::test]
    async fn groq_without_key_is_a_scorer_error() {
        let config = Config::default();
        let err = create_scorer(&config).await.err().unwrap();
        assert!(matches!(
            err,
            SentimentError::Scorer(ScorerError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn unknown_scorer_is_a_config_error() {
        let mut config = Config::default();
        config.analysis.scorer = "vader".to_string();
        let err = create_scorer(&config).await.err().unwrap();
        assert!(matches!(err, SentimentError::Config { .. }));
    }
}
