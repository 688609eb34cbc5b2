//! Deterministic word-list scorer for offline use (no network, no model files).

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use super::traits::{ChunkScorer, ScorerError};
use crate::sentiment::ScoreVector;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}']+").expect("word regex is valid"));

const POSITIVE: &[&str] = &[
    "good", "great", "excellent", "love", "loved", "amazing", "wonderful", "happy", "glad",
    "fantastic", "awesome", "best", "calm", "grateful", "thankful", "joy", "joyful", "proud",
    "relaxed", "peaceful", "hopeful", "excited", "fun", "beautiful", "nice", "enjoyed", "better",
    "smile", "laughed", "content", "relieved", "productive", "rested",
];

const NEGATIVE: &[&str] = &[
    "bad", "terrible", "awful", "hate", "hated", "horrible", "worst", "sad", "angry",
    "disappointed", "poor", "lost", "lonely", "anxious", "stressed", "tired", "exhausted",
    "upset", "afraid", "scared", "worried", "depressed", "hurt", "cry", "cried", "miserable",
    "frustrated", "overwhelmed", "annoyed", "worse", "sick", "guilty",
];

const NEGATIONS: &[&str] = &["not", "no", "never", "don't", "didn't", "isn't", "wasn't", "can't", "won't", "nothing"];

pub struct LexiconScorer {
    positive: HashSet<&'static str>,
    negative: HashSet<&'static str>,
    negations: HashSet<&'static str>,
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconScorer {
    pub fn new() -> Self {
        Self {
            positive: POSITIVE.iter().copied().collect(),
            negative: NEGATIVE.iter().copied().collect(),
            negations: NEGATIONS.iter().copied().collect(),
        }
    }

    /// Count polar words, flipping polarity when the previous word is a negation,
    /// and spread the mass across the three classes (sums to 1).
    pub fn score_text(&self, text: &str) -> ScoreVector {
        let lowered = text.to_lowercase().replace('\u{2019}', "'");
        let mut pos = 0.0f64;
        let mut neg = 0.0f64;
        let mut negated = false;
        for m in WORD.find_iter(&lowered) {
            let word = m.as_str();
            if self.negations.contains(word) {
                negated = true;
                continue;
            }
            let polarity = if self.positive.contains(word) {
                1
            } else if self.negative.contains(word) {
                -1
            } else {
                0
            };
            match (polarity, negated) {
                (1, false) | (-1, true) => pos += 1.0,
                (-1, false) | (1, true) => neg += 1.0,
                _ => {}
            }
            negated = false;
        }

        let hits = pos + neg;
        if hits == 0.0 {
            return ScoreVector::new(0.1, 0.8, 0.1);
        }
        // more polar words leave less room for neutral
        let neutral = 0.8 / (1.0 + hits);
        let polar = 1.0 - neutral;
        ScoreVector::new(polar * neg / hits, neutral, polar * pos / hits)
    }
}

#[async_trait]
impl ChunkScorer for LexiconScorer {
    async fn score(&self, chunk: &str) -> Result<ScoreVector, ScorerError> {
        Ok(self.score_text(chunk))
    }

    fn name(&self) -> &str {
        "lexicon"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::{SentimentClass, classify};

    #[test]
    fn polar_words_drive_the_label() {
        let s = LexiconScorer::new();
        assert_eq!(
            classify(&s.score_text("I had a great day at the park.")),
            SentimentClass::Positive
        );
        assert_eq!(
            classify(&s.score_text("Then I lost my wallet and felt awful.")),
            SentimentClass::Negative
        );
        assert_eq!(
            classify(&s.score_text("I walked to the store.")),
            SentimentClass::Neutral
        );
    }

    #[test]
    fn negation_flips_polarity() {
        let s = LexiconScorer::new();
        assert_eq!(
            classify(&s.score_text("I was not happy with it.")),
            SentimentClass::Negative
        );
        assert_eq!(
            classify(&s.score_text("It wasn’t bad at all.")),
            SentimentClass::Positive
        );
    }

    #[test]
    fn scores_sum_to_one() {
        let s = LexiconScorer::new();
        for text in ["", "good bad good", "awful awful", "a plain sentence"] {
            let v = s.score_text(text);
            let sum: f64 = v.to_ordered().iter().sum();
            assert!((sum - 1.0).abs() < 1e-9, "{text}: {v:?}");
        }
    }
}
