//! Chunked sentiment analysis for journal entries.
//!
//! Text is split into sentence-aligned chunks, each chunk is scored by a
//! pluggable [`scorers::ChunkScorer`], and the chunk scores are averaged into a
//! document-level result.

pub mod clients;
pub mod config;
pub mod error;
pub mod http;
pub mod insight;
pub mod scorers;
pub mod sentiment;
pub mod utils;

pub use config::Config;
pub use error::{Result, SentimentError};
pub use sentiment::{
    ChunkResult, OverallResult, ScoreVector, SentimentAnalyzer, SentimentClass, SentimentReport,
};

