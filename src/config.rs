use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::error::{Result, SentimentError};
use crate::sentiment::DEFAULT_SENTENCES_PER_CHUNK;

/// Scorer backends that `create_scorer` knows how to build.
pub const KNOWN_SCORERS: [&str; 3] = ["groq", "local", "lexicon"];

/// Main configuration structure loaded from journal_sentiment.toml and environment variables
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub groq: GroqConfig,
    pub local: LocalModelConfig,
    pub http: HttpConfig,
    /// Runtime configuration loaded from environment variables
    #[serde(skip)]
    pub runtime: RuntimeConfig,
}

/// Segmentation and scoring behavior
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub chunk_size: usize,
    pub scorer: String,
    pub scoring_concurrency: usize,
    pub score_timeout_ms: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_SENTENCES_PER_CHUNK,
            scorer: "groq".to_string(),
            scoring_concurrency: 4,
            score_timeout_ms: 30_000,
        }
    }
}

/// Hosted chat-completions endpoint (Groq or any OpenAI-compatible API)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GroqConfig {
    pub base_url: String,
    pub sentiment_model: String,
    pub sentiment_temperature: f32,
    pub insight_model: String,
    pub insight_temperature: f32,
    pub timeout_ms: u64,
    pub retries: u32,
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            sentiment_model: "llama-3-8b-8192".to_string(),
            sentiment_temperature: 0.3,
            insight_model: "llama-3.3-70b-versatile".to_string(),
            insight_temperature: 0.7,
            timeout_ms: 20_000,
            retries: 3,
        }
    }
}

/// Local sequence-classification model run with candle
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LocalModelConfig {
    pub model_id: String,
    /// Directory with config.json, tokenizer.json and weights; downloads `model_id` when unset
    pub model_path: Option<String>,
    pub use_metal: bool,
}

impl Default for LocalModelConfig {
    fn default() -> Self {
        Self {
            model_id: "cardiffnlp/twitter-roberta-base-sentiment".to_string(),
            model_path: None,
            use_metal: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: SocketAddr,
    pub request_timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8000)),
            request_timeout_ms: 120_000,
        }
    }
}

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub groq_api_key: Option<String>,
    pub log_level: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            groq_api_key: None,
            log_level: "journal_sentiment=info,tower_http=info".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Load runtime configuration from environment variables
    pub fn load_from_env() -> Self {
        let is_placeholder = |s: &str| {
            let t = s.trim();
            t.is_empty() || t.contains("${") || t.eq_ignore_ascii_case("your-api-key-here")
        };
        Self {
            groq_api_key: std::env::var("GROQ_API_KEY")
                .ok()
                .filter(|k| !is_placeholder(k)),
            log_level: std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "journal_sentiment=info,tower_http=info".to_string()),
        }
    }
}

impl Config {
    /// Load configuration from TOML file and environment variables
    /// Uses JOURNAL_SENTIMENT_CONFIG environment variable or defaults to "journal_sentiment.toml"
    pub fn load() -> Result<Self> {
        if let Ok(env_path) = std::env::var("SENTIMENT_ENV_FILE") {
            let _ = dotenvy::from_path(env_path);
        } else {
            let _ = dotenvy::from_path(".env");
        }

        let config_path = std::env::var("JOURNAL_SENTIMENT_CONFIG")
            .unwrap_or_else(|_| "journal_sentiment.toml".to_string());

        let mut config = match std::fs::read_to_string(&config_path) {
            Ok(content) => Self::from_toml_str(&content)?,
            Err(_) => {
                tracing::warn!("Config file {} not found, using defaults", config_path);
                Self::default()
            }
        };

        config.apply_env_overrides();
        config.runtime = RuntimeConfig::load_from_env();
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply SENTIMENT_* environment overrides (env-first)
    pub fn apply_env_overrides(&mut self) {
        if let Ok(scorer) = std::env::var("SENTIMENT_SCORER") {
            self.analysis.scorer = scorer.trim().to_lowercase();
        }
        if let Some(size) = env_parse::<usize>("SENTIMENT_CHUNK_SIZE") {
            self.analysis.chunk_size = size;
        }
        if let Some(n) = env_parse::<usize>("SENTIMENT_CONCURRENCY") {
            self.analysis.scoring_concurrency = n;
        }
        if let Some(ms) = env_parse::<u64>("SENTIMENT_SCORE_TIMEOUT_MS") {
            self.analysis.score_timeout_ms = ms;
        }
        if let Ok(url) = std::env::var("SENTIMENT_GROQ_BASE_URL") {
            self.groq.base_url = url;
        }
        if let Ok(model) = std::env::var("SENTIMENT_GROQ_MODEL") {
            self.groq.sentiment_model = model;
        }
        if let Ok(model) = std::env::var("SENTIMENT_INSIGHT_MODEL") {
            self.groq.insight_model = model;
        }
        if let Ok(id) = std::env::var("SENTIMENT_LOCAL_MODEL_ID") {
            self.local.model_id = id;
        }
        if let Ok(path) = std::env::var("SENTIMENT_LOCAL_MODEL_PATH") {
            self.local.model_path = Some(path).filter(|p| !p.trim().is_empty());
        }
        if let Ok(v) = std::env::var("SENTIMENT_USE_METAL") {
            self.local.use_metal = v != "false" && v != "0";
        }
        if let Ok(v) = std::env::var("SENTIMENT_HTTP_BIND") {
            match v.parse::<SocketAddr>() {
                Ok(bind) => self.http.bind = bind,
                Err(_) => tracing::warn!("Ignoring unparseable SENTIMENT_HTTP_BIND '{}'", v),
            }
        }
    }

    /// Clamp soft limits instead of failing
    pub fn normalize(&mut self) {
        if self.groq.retries == 0 {
            self.groq.retries = 1;
        } else if self.groq.retries > 5 {
            tracing::warn!("groq.retries {} exceeds max 5, clamping", self.groq.retries);
            self.groq.retries = 5;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.analysis.chunk_size == 0 {
            return Err(config_err("analysis.chunk_size must be at least 1"));
        }
        if self.analysis.scoring_concurrency == 0 {
            return Err(config_err("analysis.scoring_concurrency must be at least 1"));
        }
        if self.analysis.score_timeout_ms == 0 {
            return Err(config_err("analysis.score_timeout_ms must be > 0"));
        }
        if !KNOWN_SCORERS.contains(&self.analysis.scorer.as_str()) {
            return Err(config_err(&format!(
                "unknown scorer '{}', expected one of {}",
                self.analysis.scorer,
                KNOWN_SCORERS.join(", ")
            )));
        }
        for (name, t) in [
            ("groq.sentiment_temperature", self.groq.sentiment_temperature),
            ("groq.insight_temperature", self.groq.insight_temperature),
        ] {
            if !(0.0..=2.0).contains(&t) {
                return Err(config_err(&format!("{name} must be between 0.0 and 2.0")));
            }
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn config_err(message: &str) -> SentimentError {
    SentimentError::Config {
        message: message.to_string(),
    }
}
