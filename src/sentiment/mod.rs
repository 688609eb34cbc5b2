//! Chunked sentiment analysis: segmentation, per-chunk labels, document aggregate.

pub mod aggregator;
pub mod analyzer;
pub mod classifier;
pub mod report;
pub mod segmenter;
pub mod types;

pub use aggregator::{aggregate, default_overall};
pub use analyzer::SentimentAnalyzer;
pub use classifier::classify;
pub use report::{build, fallback_report};
pub use segmenter::{DEFAULT_SENTENCES_PER_CHUNK, Segmenter, segment, split_sentences};
pub use types::{ChunkResult, OverallResult, ScoreVector, SentimentClass, SentimentReport};
