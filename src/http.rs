//! HTTP transport module for journal-sentiment
//!
//! Axum router exposing analysis and insight endpoints. Health and info are plain JSON.

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use std::{sync::Arc, time::Duration};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    config::Config,
    error::{Result, SentimentError},
    insight::{InsightGenerator, MoodInsight},
    sentiment::{SentimentAnalyzer, SentimentReport},
};

/// Shared state for HTTP server
#[derive(Clone)]
pub struct HttpState {
    pub config: Arc<Config>,
    pub analyzer: Arc<SentimentAnalyzer>,
    pub insights: Arc<InsightGenerator>,
}

/// Request body shared by both endpoints; `text` may be absent.
#[derive(Debug, Deserialize)]
pub struct TextRequest {
    #[serde(default)]
    pub text: Option<String>,
}

impl TextRequest {
    fn require_text(self) -> Result<String> {
        match self.text {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(SentimentError::Validation {
                message: "No text provided".to_string(),
            }),
        }
    }
}

/// Health check endpoint
pub async fn health_handler() -> impl IntoResponse {
    "ok"
}

/// Info endpoint
pub async fn info_handler(State(state): State<HttpState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "scorer": state.analyzer.scorer_name(),
            "chunk_size": state.analyzer.segmenter().max_sentences_per_chunk(),
            "scoring_concurrency": state.config.analysis.scoring_concurrency,
        })
        .to_string(),
    )
}

/// Sentence-chunked sentiment report for the posted text.
///
/// Bounded by `http.request_timeout_ms`; running out of time yields the fallback report.
pub async fn analyze_handler(
    State(state): State<HttpState>,
    Json(request): Json<TextRequest>,
) -> Result<Json<SentimentReport>> {
    let text = request.require_text()?;
    let deadline = Duration::from_millis(state.config.http.request_timeout_ms);
    Ok(Json(state.analyzer.analyze_within(&text, deadline).await))
}

/// Summary, suggestion and affirmation for the posted text
pub async fn insight_handler(
    State(state): State<HttpState>,
    Json(request): Json<TextRequest>,
) -> Result<Json<MoodInsight>> {
    let text = request.require_text()?;
    Ok(Json(state.insights.generate(&text).await))
}

pub fn router(state: HttpState) -> Router {
    let timeout = Duration::from_millis(state.config.http.request_timeout_ms);
    // /analyze enforces its own deadline so it can still answer with a report
    let bounded = Router::new()
        .route("/health", get(health_handler))
        .route("/info", get(info_handler))
        .route("/generate-insight", post(insight_handler))
        .layer(TimeoutLayer::new(timeout));
    Router::new()
        .route("/analyze", post(analyze_handler))
        .merge(bounded)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_http_server(state: HttpState) -> Result<()> {
    let bind = state.config.http.bind;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind HTTP listener: {}", e))?;

    tracing::info!("Starting HTTP server on {}", bind);

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("HTTP server error: {}", e))?;

    Ok(())
}
