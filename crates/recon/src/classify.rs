use serde::Serialize;

use crate::model::RiskTier;

/// Scores at or above this are treated as a confirmed match.
pub const HIGH_CONFIDENCE_THRESHOLD: i32 = 90;

/// Review threshold used when none is configured.
pub const DEFAULT_MATCH_THRESHOLD: i32 = 70;

pub const STATUS_MATCH_FOUND: &str = "✅ Match Found";
pub const STATUS_REVIEW_REQUIRED: &str = "⚠️ Review Required";
pub const STATUS_REVENUE_LEAKAGE: &str = "❌ REVENUE LEAKAGE";

/// The two cut-offs the classifier works with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Thresholds {
    pub high_confidence: i32,
    pub review: i32,
}

impl Thresholds {
    /// Fixed high-confidence cut-off with a caller-chosen review threshold.
    pub fn new(review: i32) -> Self {
        Self { high_confidence: HIGH_CONFIDENCE_THRESHOLD, review }
    }

    pub fn with_high_confidence(mut self, high_confidence: i32) -> Self {
        self.high_confidence = high_confidence;
        self
    }

    /// Review threshold above the high-confidence one. Medium is then
    /// unreachable: anything that clears review already clears high confidence.
    pub fn is_inverted(&self) -> bool {
        self.review > self.high_confidence
    }

    pub fn classify(&self, score: u8) -> (&'static str, RiskTier) {
        classify(score, self.high_confidence, self.review)
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::new(DEFAULT_MATCH_THRESHOLD)
    }
}

/// Map a score to (status label, risk tier). Checked in order, inclusive:
/// high confidence -> Low, review -> Medium, else High.
pub fn classify(score: u8, high_confidence_threshold: i32, review_threshold: i32) -> (&'static str, RiskTier) {
    let score = i32::from(score);
    if score >= high_confidence_threshold {
        (STATUS_MATCH_FOUND, RiskTier::Low)
    } else if score >= review_threshold {
        (STATUS_REVIEW_REQUIRED, RiskTier::Medium)
    } else {
        (STATUS_REVENUE_LEAKAGE, RiskTier::High)
    }
}
