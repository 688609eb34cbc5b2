use super::types::{ScoreVector, SentimentClass};

/// Pick the class with the highest score.
///
/// Exact ties resolve to the earliest class in enumeration order
/// (negative, neutral, positive), so the result never depends on iteration quirks.
pub fn classify(scores: &ScoreVector) -> SentimentClass {
    let mut best = SentimentClass::ALL[0];
    let mut best_score = scores.get(best);
    for class in &SentimentClass::ALL[1..] {
        let score = scores.get(*class);
        // strict comparison keeps the earlier class on ties
        if score > best_score {
            best = *class;
            best_score = score;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_maximum() {
        assert_eq!(
            classify(&ScoreVector::new(0.1, 0.2, 0.7)),
            SentimentClass::Positive
        );
        assert_eq!(
            classify(&ScoreVector::new(0.6, 0.3, 0.1)),
            SentimentClass::Negative
        );
        assert_eq!(
            classify(&ScoreVector::new(0.2, 0.5, 0.3)),
            SentimentClass::Neutral
        );
    }

    #[test]
    fn ties_resolve_to_earliest_class() {
        assert_eq!(
            classify(&ScoreVector::new(0.4, 0.4, 0.2)),
            SentimentClass::Negative
        );
        assert_eq!(
            classify(&ScoreVector::new(0.2, 0.4, 0.4)),
            SentimentClass::Neutral
        );
        assert_eq!(
            classify(&ScoreVector::new(0.4, 0.2, 0.4)),
            SentimentClass::Negative
        );
        let third = 1.0 / 3.0;
        for _ in 0..10 {
            assert_eq!(
                classify(&ScoreVector::new(third, third, third)),
                SentimentClass::Negative
            );
        }
    }

    #[test]
    fn does_not_require_normalized_scores() {
        assert_eq!(
            classify(&ScoreVector::new(0.0, 0.0, 0.01)),
            SentimentClass::Positive
        );
        assert_eq!(
            classify(&ScoreVector::new(0.0, 0.0, 0.0)),
            SentimentClass::Negative
        );
    }
}
