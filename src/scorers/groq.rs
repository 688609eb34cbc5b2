//! Hosted chat model emulating a three-class sentiment classifier.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::traits::{ChunkScorer, ScorerError};
use crate::clients::{ChatRequest, GroqClient, extract_json_object};
use crate::config::GroqConfig;
use crate::sentiment::ScoreVector;

const SYSTEM_PROMPT: &str = "You are a sentiment analysis engine.";

pub struct GroqScorer {
    client: GroqClient,
    model: String,
    temperature: f32,
}

#[derive(Deserialize)]
struct RawScores {
    negative: f64,
    neutral: f64,
    positive: f64,
}

impl GroqScorer {
    pub fn new(cfg: &GroqConfig, api_key: Option<String>) -> Result<Self, ScorerError> {
        let api_key = api_key
            .ok_or_else(|| ScorerError::Unavailable("GROQ_API_KEY is not set".to_string()))?;
        let client = GroqClient::new(cfg, api_key)?;
        Ok(Self {
            client,
            model: cfg.sentiment_model.clone(),
            temperature: cfg.sentiment_temperature,
        })
    }
}

fn build_prompt(chunk: &str) -> String {
    format!(
        r#"You are emulating a sentiment analysis model like twitter-roberta-base-sentiment. Score the following passage from a journal entry.

Return sentiment **scores** (negative, neutral, positive) as floats between 0 and 1, like the softmax output of a classifier.

Respond strictly with a JSON object in this format:
{{
  "negative": float,
  "neutral": float,
  "positive": float
}}

Text to analyze:
"""{chunk}""""#
    )
}

/// Parse a model reply into scores, rejecting missing, non-finite or out-of-range values.
pub fn parse_scores(reply: &str) -> Result<ScoreVector, ScorerError> {
    let value = extract_json_object(reply).map_err(|e| ScorerError::Parse(e.to_string()))?;
    // some models nest the answer under "scores"
    let value = match value.get("scores") {
        Some(inner) if inner.is_object() => inner.clone(),
        _ => value,
    };
    let raw: RawScores =
        serde_json::from_value(value).map_err(|e| ScorerError::Parse(e.to_string()))?;
    let scores = ScoreVector::new(raw.negative, raw.neutral, raw.positive);

    if let Some(bad) = scores
        .to_ordered()
        .into_iter()
        .find(|v| !v.is_finite() || !(0.0..=1.0).contains(v))
    {
        return Err(ScorerError::InvalidScores(format!(
            "score {bad} outside [0, 1]"
        )));
    }
    Ok(scores)
}

#[async_trait]
impl ChunkScorer for GroqScorer {
    async fn score(&self, chunk: &str) -> Result<ScoreVector, ScorerError> {
        let prompt = build_prompt(chunk);
        let reply = self
            .client
            .chat(&ChatRequest {
                model: &self.model,
                system: SYSTEM_PROMPT,
                user: &prompt,
                temperature: self.temperature,
                json_mode: true,
            })
            .await?;
        debug!(model = %self.model, "Groq sentiment reply: {}", reply);
        parse_scores(&reply)
    }

    fn name(&self) -> &str {
        "groq"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flat_and_nested_scores() {
        let s = parse_scores(r#"{"negative": 0.1, "neutral": 0.3, "positive": 0.6}"#).unwrap();
        assert_eq!(s, ScoreVector::new(0.1, 0.3, 0.6));

        let s = parse_scores(
            "```json\n{\"scores\": {\"negative\": 0.7, \"neutral\": 0.2, \"positive\": 0.1}, \"label\": \"negative\"}\n```",
        )
        .unwrap();
        assert_eq!(s, ScoreVector::new(0.7, 0.2, 0.1));
    }

    #[test]
    fn missing_key_is_parse_error() {
        let err = parse_scores(r#"{"negative": 0.1, "positive": 0.6}"#).unwrap_err();
        assert!(matches!(err, ScorerError::Parse(_)));
    }

    #[test]
    fn out_of_range_is_invalid() {
        let err = parse_scores(r#"{"negative": 1.5, "neutral": 0.0, "positive": 0.0}"#).unwrap_err();
        assert!(matches!(err, ScorerError::InvalidScores(_)));
    }

    #[test]
    fn missing_key_fails_construction() {
        let err = GroqScorer::new(&GroqConfig::default(), None).err().unwrap();
        assert!(matches!(err, ScorerError::Unavailable(_)));
    }

    #[test]
    fn prompt_embeds_chunk() {
        let p = build_prompt("I feel calm.");
        assert!(p.contains("\"\"\"I feel calm.\"\"\""));
        assert!(p.contains("\"neutral\": float"));
    }
}
