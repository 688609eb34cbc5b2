//! Free-text mood insight for a journal entry: summary, suggestion, affirmation.
//!
//! Generation never fails from the caller's point of view; any problem yields
//! [`MoodInsight::fallback`].

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clients::{ChatRequest, GroqClient, extract_json_object};
use crate::config::Config;
use crate::error::{Result, SentimentError};

const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodInsight {
    pub summary: String,
    pub suggestion: String,
    pub affirmation: String,
}

impl MoodInsight {
    pub fn fallback() -> Self {
        Self {
            summary: "Could not generate summary.".to_string(),
            suggestion: "Try reflecting on what felt good today.".to_string(),
            affirmation: "You are growing every day.".to_string(),
        }
    }
}

pub struct InsightGenerator {
    client: Option<GroqClient>,
    model: String,
    temperature: f32,
}

impl InsightGenerator {
    /// Without an API key the generator is built anyway and always returns the fallback.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = match &config.runtime.groq_api_key {
            Some(key) => Some(GroqClient::new(&config.groq, key.clone())?),
            None => {
                warn!("GROQ_API_KEY not set; mood insights will use the fallback text");
                None
            }
        };
        Ok(Self {
            client,
            model: config.groq.insight_model.clone(),
            temperature: config.groq.insight_temperature,
        })
    }

    pub async fn generate(&self, journal_text: &str) -> MoodInsight {
        match self.try_generate(journal_text).await {
            Ok(insight) => insight,
            Err(e) => {
                warn!(error = %e, "Mood insight generation failed, using fallback");
                MoodInsight::fallback()
            }
        }
    }

    pub async fn try_generate(&self, journal_text: &str) -> Result<MoodInsight> {
        let client = self.client.as_ref().ok_or_else(|| SentimentError::Insight {
            message: "no chat client configured".to_string(),
        })?;
        let prompt = build_prompt(journal_text);
        let reply = client
            .chat(&ChatRequest {
                model: &self.model,
                system: SYSTEM_PROMPT,
                user: &prompt,
                temperature: self.temperature,
                json_mode: false,
            })
            .await
            .map_err(|e| SentimentError::Insight {
                message: format!("{e:#}"),
            })?;
        debug!("Insight raw output: {}", reply);
        parse_insight(&reply)
    }
}

fn build_prompt(journal_text: &str) -> String {
    format!(
        r#"
You are a kind and supportive mental health assistant. Answer as if you are speaking to me directly. Analyze the following journal entry and provide insights into the emotional tone, suggestions for reflection, and a positive affirmation based on the user's feelings.
Analyze the following journal entry and respond with a JSON object that includes:

- A short summary of the emotional tone
- A suggestion or reflection for the user
- A positive affirmation based on their feelings

Respond strictly in this format:
{{
  "summary": "...",
  "suggestion": "...",
  "affirmation": "..."
}}

Journal Entry:
"""{journal_text}"""
"#
    )
}

/// Parse the model reply; all three fields must be present and non-empty.
pub fn parse_insight(reply: &str) -> Result<MoodInsight> {
    let value = extract_json_object(reply).map_err(|e| SentimentError::Insight {
        message: e.to_string(),
    })?;
    let insight: MoodInsight = serde_json::from_value(value)?;
    if [&insight.summary, &insight.suggestion, &insight.affirmation]
        .iter()
        .any(|s| s.trim().is_empty())
    {
        return Err(SentimentError::Insight {
            message: "insight has an empty field".to_string(),
        });
    }
    Ok(insight)
}
