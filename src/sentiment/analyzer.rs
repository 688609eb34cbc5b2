//! Runs one analysis: segment, score every chunk, classify, aggregate, report.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{StreamExt, TryStreamExt, stream};
use tracing::{debug, warn};

use super::aggregator::aggregate;
use super::classifier::classify;
use super::report::{build, fallback_report};
use super::segmenter::Segmenter;
use super::types::{ChunkResult, SentimentReport};
use crate::config::Config;
use crate::error::{Result, SentimentError};
use crate::scorers::{ChunkScorer, ScorerError};

pub struct SentimentAnalyzer {
    scorer: Arc<dyn ChunkScorer>,
    segmenter: Segmenter,
    concurrency: usize,
    score_timeout: Duration,
}

impl SentimentAnalyzer {
    pub fn new(scorer: Arc<dyn ChunkScorer>, segmenter: Segmenter) -> Self {
        Self {
            scorer,
            segmenter,
            concurrency: 1,
            score_timeout: Duration::from_secs(30),
        }
    }

    pub fn from_config(scorer: Arc<dyn ChunkScorer>, config: &Config) -> Result<Self> {
        let segmenter = Segmenter::new(config.analysis.chunk_size)?;
        Ok(Self::new(scorer, segmenter)
            .with_concurrency(config.analysis.scoring_concurrency)
            .with_score_timeout(Duration::from_millis(config.analysis.score_timeout_ms)))
    }

    /// Number of chunks scored at once. Output order never depends on this.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_score_timeout(mut self, timeout: Duration) -> Self {
        self.score_timeout = timeout;
        self
    }

    pub fn scorer_name(&self) -> &str {
        self.scorer.name()
    }

    pub fn segmenter(&self) -> &Segmenter {
        &self.segmenter
    }

    /// Analyze `text`, degrading to the fallback report on any scorer failure.
    pub async fn analyze(&self, text: &str) -> SentimentReport {
        match self.try_analyze(text).await {
            Ok(report) => report,
            Err(e) => {
                warn!(scorer = self.scorer.name(), error = %e, "Sentiment scoring failed, returning fallback report");
                fallback_report()
            }
        }
    }

    /// Like [`analyze`](Self::analyze), but the whole run must finish within `deadline`.
    pub async fn analyze_within(&self, text: &str, deadline: Duration) -> SentimentReport {
        match self.try_analyze_within(text, deadline).await {
            Ok(report) => report,
            Err(e) => {
                warn!(scorer = self.scorer.name(), error = %e, "Sentiment analysis failed, returning fallback report");
                fallback_report()
            }
        }
    }

    pub async fn try_analyze_within(&self, text: &str, deadline: Duration) -> Result<SentimentReport> {
        match tokio::time::timeout(deadline, self.try_analyze(text)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(SentimentError::Timeout {
                operation: "sentiment analysis".to_string(),
                timeout_ms: deadline.as_millis() as u64,
            }),
        }
    }

    /// Analyze `text`, surfacing the first scorer failure instead of falling back.
    ///
    /// Any failing chunk fails the whole run; partial chunk lists are never returned.
    pub async fn try_analyze(&self, text: &str) -> std::result::Result<SentimentReport, ScorerError> {
        let chunks = self.segmenter.segment(text);
        debug!(
            chunks = chunks.len(),
            chars = text.len(),
            scorer = self.scorer.name(),
            "Segmented text"
        );

        // `buffered` yields in input order regardless of completion order
        let results: Vec<ChunkResult> = stream::iter(chunks.into_iter().enumerate())
            .map(|(index, chunk)| self.score_chunk(index, chunk))
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        let overall = aggregate(&results);
        Ok(build(results, overall))
    }

    async fn score_chunk(
        &self,
        index: usize,
        chunk: String,
    ) -> std::result::Result<ChunkResult, ScorerError> {
        let timeout_ms = self.score_timeout.as_millis() as u64;
        let scores = tokio::time::timeout(self.score_timeout, self.scorer.score(&chunk))
            .await
            .map_err(|_| ScorerError::Timeout { timeout_ms })??;

        if !scores.is_finite() {
            return Err(ScorerError::InvalidScores(format!(
                "chunk {index} produced non-finite scores {scores:?}"
            )));
        }
        if !scores.is_unit_range() {
            return Err(ScorerError::InvalidScores(format!(
                "chunk {index} produced scores outside [0, 1] {scores:?}"
            )));
        }

        let label = classify(&scores);
        debug!(index, %label, "Scored chunk");
        Ok(ChunkResult {
            text: chunk,
            scores,
            label,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::{ScoreVector, SentimentClass};
    use async_trait::async_trait;

    struct Constant(ScoreVector);

    #[async_trait]
    impl ChunkScorer for Constant {
        async fn score(&self, _chunk: &str) -> std::result::Result<ScoreVector, ScorerError> {
            Ok(self.0)
        }

        fn name(&self) -> &str {
            "constant"
        }
    }

    struct Slow;

    #[async_trait]
    impl ChunkScorer for Slow {
        async fn score(&self, _chunk: &str) -> std::result::Result<ScoreVector, ScorerError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(ScoreVector::new(0.0, 0.0, 1.0))
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    #[tokio::test]
    async fn empty_text_gives_neutral_default() {
        let analyzer = SentimentAnalyzer::new(
            Arc::new(Constant(ScoreVector::new(1.0, 0.0, 0.0))),
            Segmenter::default(),
        );
        let report = analyzer.analyze("").await;
        assert_eq!(report, fallback_report());
    }

    #[tokio::test]
    async fn non_finite_scores_fail_the_run() {
        let analyzer = SentimentAnalyzer::new(
            Arc::new(Constant(ScoreVector::new(f64::NAN, 0.5, 0.5))),
            Segmenter::default(),
        );
        let err = analyzer.try_analyze("Hello there.").await.unwrap_err();
        assert!(matches!(err, ScorerError::InvalidScores(_)));
        assert_eq!(analyzer.analyze("Hello there.").await, fallback_report());
    }

    #[tokio::test]
    async fn out_of_range_scores_fail_the_run() {
        for scores in [
            ScoreVector::new(0.0, 0.0, 1.5),
            ScoreVector::new(-0.2, 0.6, 0.6),
        ] {
            let analyzer = SentimentAnalyzer::new(Arc::new(Constant(scores)), Segmenter::default());
            let err = analyzer.try_analyze("Hello there.").await.unwrap_err();
            assert!(matches!(err, ScorerError::InvalidScores(_)));
            assert_eq!(analyzer.analyze("Hello there.").await, fallback_report());
        }
    }

    #[tokio::test]
    async fn run_deadline_yields_timeout_then_fallback() {
        let analyzer = SentimentAnalyzer::new(Arc::new(Slow), Segmenter::default());
        let err = analyzer
            .try_analyze_within("Waiting.", Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SentimentError::Timeout { timeout_ms: 20, .. }
        ));
        let report = analyzer
            .analyze_within("Waiting.", Duration::from_millis(20))
            .await;
        assert_eq!(report, fallback_report());
    }

    #[tokio::test]
    async fn timeout_is_a_scorer_failure() {
        let analyzer = SentimentAnalyzer::new(Arc::new(Slow), Segmenter::default())
            .with_score_timeout(Duration::from_millis(20));
        let err = analyzer.try_analyze("Waiting.").await.unwrap_err();
        assert!(matches!(err, ScorerError::Timeout { timeout_ms: 20 }));
        let report = analyzer.analyze("Waiting.").await;
        assert!(report.chunks.is_empty());
        assert_eq!(report.overall.label, SentimentClass::Neutral);
    }

    #[tokio::test]
    async fn from_config_uses_chunk_size() {
        let mut config = Config::default();
        config.analysis.chunk_size = 1;
        let analyzer = SentimentAnalyzer::from_config(
            Arc::new(Constant(ScoreVector::new(0.1, 0.1, 0.8))),
            &config,
        )
        .unwrap();
        let report = analyzer.analyze("Good. Great. Fine.").await;
        assert_eq!(report.chunks.len(), 3);
        assert_eq!(report.overall.label, SentimentClass::Positive);
    }
}
