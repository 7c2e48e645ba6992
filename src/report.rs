// src/report.rs
//! Wire-level report types. Field names are camelCase to match the UI
//! contract the original frontend renders.

use serde::{Deserialize, Serialize};

use crate::dimensions::DimensionScores;

/// One extracted fact or opinion, in order of appearance. Not deduplicated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedClaim {
    pub content: String,
    pub confidence: f64,
}

impl ExtractedClaim {
    pub fn new(content: impl Into<String>, confidence: f64) -> Self {
        Self {
            content: content.into(),
            confidence,
        }
    }
}

/// Normalized analysis result; immutable once returned and cached by
/// content+title fingerprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub credibility: f64,
    pub facts: Vec<ExtractedClaim>,
    pub opinions: Vec<ExtractedClaim>,
    pub bias: Vec<String>,
    pub publisher_advice: String,
    pub pr_reply: String,
    pub summary: String,
    pub dimensions: DimensionScores,
}

impl AnalysisReport {
    /// Error-flagged but fully-populated report: every text field carries the
    /// reason, numeric fields are zeroed. The rendering layer always receives
    /// a well-formed shape.
    pub fn degraded(reason: &str) -> Self {
        Self {
            credibility: 0.0,
            facts: vec![ExtractedClaim::new(reason, 0.0)],
            opinions: vec![ExtractedClaim::new(reason, 0.0)],
            bias: vec![reason.to_string()],
            publisher_advice: reason.to_string(),
            pr_reply: reason.to_string(),
            summary: reason.to_string(),
            dimensions: DimensionScores::zero(),
        }
    }
}
