//! Data model for a sentiment run: classes, score vectors, per-chunk and overall results.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed set of sentiment classes.
///
/// Declaration order is the tie-break order used by [`crate::sentiment::classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentClass {
    Negative,
    Neutral,
    Positive,
}

impl SentimentClass {
    /// All classes in enumeration order.
    pub const ALL: [SentimentClass; 3] = [
        SentimentClass::Negative,
        SentimentClass::Neutral,
        SentimentClass::Positive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentClass::Negative => "negative",
            SentimentClass::Neutral => "neutral",
            SentimentClass::Positive => "positive",
        }
    }

    /// Parse a class name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "negative" => Some(SentimentClass::Negative),
            "neutral" => Some(SentimentClass::Neutral),
            "positive" => Some(SentimentClass::Positive),
            _ => None,
        }
    }
}

impl fmt::Display for SentimentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Probability-like value per class. Values are not required to sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreVector {
    pub negative: f64,
    pub neutral: f64,
    pub positive: f64,
}

impl ScoreVector {
    pub const fn new(negative: f64, neutral: f64, positive: f64) -> Self {
        Self {
            negative,
            neutral,
            positive,
        }
    }

    /// Fail-safe vector used whenever no chunk scores are available.
    pub const fn neutral_default() -> Self {
        Self::new(0.0, 1.0, 0.0)
    }

    pub fn get(&self, class: SentimentClass) -> f64 {
        match class {
            SentimentClass::Negative => self.negative,
            SentimentClass::Neutral => self.neutral,
            SentimentClass::Positive => self.positive,
        }
    }

    /// Build from values in enumeration order (negative, neutral, positive).
    pub fn from_ordered(values: [f64; 3]) -> Self {
        Self::new(values[0], values[1], values[2])
    }

    pub fn to_ordered(&self) -> [f64; 3] {
        [self.negative, self.neutral, self.positive]
    }

    pub fn is_finite(&self) -> bool {
        self.to_ordered().iter().all(|v| v.is_finite())
    }

    /// Every component lies in [0, 1]. NaN fails.
    pub fn is_unit_range(&self) -> bool {
        self.to_ordered().iter().all(|v| (0.0..=1.0).contains(v))
    }
}

/// One scored chunk of the input text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkResult {
    pub text: String,
    pub scores: ScoreVector,
    pub label: SentimentClass,
}

/// Document-level view derived from all chunk scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallResult {
    pub average_scores: ScoreVector,
    pub label: SentimentClass,
}

/// Final result of an analysis run. `chunks` keeps source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentReport {
    pub chunks: Vec<ChunkResult>,
    pub overall: OverallResult,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn class_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(SentimentClass::Positive).unwrap(),
            json!("positive")
        );
        let parsed: SentimentClass = serde_json::from_str("\"neutral\"").unwrap();
        assert_eq!(parsed, SentimentClass::Neutral);
    }

    #[test]
    fn from_name_is_case_insensitive() {
        assert_eq!(
            SentimentClass::from_name(" Negative "),
            Some(SentimentClass::Negative)
        );
        assert_eq!(SentimentClass::from_name("LABEL_0"), None);
    }

    #[test]
    fn report_has_expected_wire_shape() {
        let report = SentimentReport {
            chunks: vec![ChunkResult {
                text: "Fine.".to_string(),
                scores: ScoreVector::new(0.1, 0.7, 0.2),
                label: SentimentClass::Neutral,
            }],
            overall: OverallResult {
                average_scores: ScoreVector::new(0.1, 0.7, 0.2),
                label: SentimentClass::Neutral,
            },
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(
            value,
            json!({
                "chunks": [{
                    "text": "Fine.",
                    "scores": {"negative": 0.1, "neutral": 0.7, "positive": 0.2},
                    "label": "neutral"
                }],
                "overall": {
                    "average_scores": {"negative": 0.1, "neutral": 0.7, "positive": 0.2},
                    "label": "neutral"
                }
            })
        );
    }
}
