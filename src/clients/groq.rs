use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

use crate::config::GroqConfig;

/// Minimal OpenAI-compatible chat-completions client (Groq by default).
#[derive(Clone, Debug)]
pub struct GroqClient {
    endpoint: String,
    api_key: String,
    retries: u32,
    client: Client,
}

/// One chat request: system prompt, user prompt and sampling settings.
#[derive(Debug, Clone)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub system: &'a str,
    pub user: &'a str,
    pub temperature: f32,
    pub json_mode: bool,
}

impl GroqClient {
    pub fn new(cfg: &GroqConfig, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .context("Failed to build reqwest client with timeout")?;

        let base = cfg.base_url.trim_end_matches('/');
        let endpoint = if base.ends_with("/chat/completions") {
            base.to_string()
        } else {
            format!("{}/chat/completions", base)
        };

        Ok(Self {
            endpoint,
            api_key,
            retries: cfg.retries.max(1),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one chat request and return the first choice's message content.
    ///
    /// Transport errors and non-success statuses are retried with exponential backoff.
    pub async fn chat(&self, request: &ChatRequest<'_>) -> Result<String> {
        let mut body = json!({
            "model": request.model,
            "messages": [
                {"role": "system", "content": request.system},
                {"role": "user", "content": request.user}
            ],
            "temperature": request.temperature
        });
        if request.json_mode {
            body["response_format"] = json!({"type": "json_object"});
        }

        let mut last_err: Option<anyhow::Error> = None;
        for i in 0..self.retries {
            if i > 0 {
                let delay_ms = 200u64 * (1u64 << (i - 1));
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }

            let send_res = self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await
                .context("Failed to send chat request");
            let response = match send_res {
                Ok(resp) => resp,
                Err(e) => {
                    last_err = Some(e);
                    continue;
                }
            };

            if !response.status().is_success() {
                let status = response.status();
                let error_text = response.text().await.unwrap_or_default();
                last_err = Some(anyhow::anyhow!("Chat API error {}: {}", status, error_text));
                // client errors will not improve on retry
                if status.is_client_error() && status.as_u16() != 429 {
                    break;
                }
                continue;
            }

            let response_json: Value = response
                .json()
                .await
                .context("Failed to parse chat response")?;
            let content = response_json["choices"][0]["message"]["content"]
                .as_str()
                .context("Chat response has no message content")?
                .trim()
                .to_string();
            debug!(model = request.model, chars = content.len(), "Chat completion received");
            return Ok(content);
        }

        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("Unknown chat completion error")))
    }
}

/// Extract the first JSON object from a model reply, tolerating code fences and chatter.
pub fn extract_json_object(text: &str) -> Result<Value> {
    let trimmed = text
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    if let Ok(v) = serde_json::from_str::<Value>(trimmed)
        && v.is_object()
    {
        return Ok(v);
    }

    let start = trimmed.find('{').context("No JSON object in model output")?;
    let end = trimmed.rfind('}').context("No JSON object in model output")?;
    if end < start {
        anyhow::bail!("No JSON object in model output");
    }
    serde_json::from_str(&trimmed[start..=end]).context("Failed to parse JSON object from model output")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_is_normalized() {
        let cfg = GroqConfig {
            base_url: "https://api.groq.com/openai/v1/".to_string(),
            ..GroqConfig::default()
        };
        let client = GroqClient::new(&cfg, "k".to_string()).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://api.groq.com/openai/v1/chat/completions"
        );
    }

    #[test]
    fn extracts_plain_and_fenced_json() {
        let v = extract_json_object(r#"{"a": 1}"#).unwrap();
        assert_eq!(v["a"], 1);
        let v = extract_json_object("```json\n{\"a\": 2}\n```").unwrap();
        assert_eq!(v["a"], 2);
        let v = extract_json_object("Sure! Here it is: {\"a\": 3} Hope that helps.").unwrap();
        assert_eq!(v["a"], 3);
    }

    #[test]
    fn rejects_output_without_object() {
        assert!(extract_json_object("no json here").is_err());
        assert!(extract_json_object("} backwards {").is_err());
    }
}
