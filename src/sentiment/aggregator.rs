//! Document-level aggregation over chunk scores.

use super::classifier::classify;
use super::types::{ChunkResult, OverallResult, ScoreVector, SentimentClass};

/// Unweighted mean of every chunk's scores, relabelled with [`classify`].
///
/// The overall label always comes from the averaged vector, never from a vote
/// over chunk labels. With no chunks this returns the neutral default.
pub fn aggregate(results: &[ChunkResult]) -> OverallResult {
    if results.is_empty() {
        return default_overall();
    }

    let mut sums = [0.0f64; 3];
    for result in results {
        for (sum, value) in sums.iter_mut().zip(result.scores.to_ordered()) {
            *sum += value;
        }
    }

    let count = results.len() as f64;
    let average_scores = ScoreVector::from_ordered(sums.map(|sum| sum / count));

    OverallResult {
        label: classify(&average_scores),
        average_scores,
    }
}

/// Overall result used when there is nothing to aggregate.
pub fn default_overall() -> OverallResult {
    OverallResult {
        average_scores: ScoreVector::neutral_default(),
        label: SentimentClass::Neutral,
    }
}
