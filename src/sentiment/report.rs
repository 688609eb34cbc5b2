use super::aggregator::default_overall;
use super::types::{ChunkResult, OverallResult, SentimentReport};

/// Assemble a report from already-ordered chunk results and their aggregate.
pub fn build(chunks: Vec<ChunkResult>, overall: OverallResult) -> SentimentReport {
    SentimentReport { chunks, overall }
}

/// The canonical report returned when a run cannot be completed:
/// no chunks, neutral default overall.
pub fn fallback_report() -> SentimentReport {
    build(Vec::new(), default_overall())
}
