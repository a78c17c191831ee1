//! Debate arguments

use serde::{Deserialize, Serialize};

/// A structured position taken by one side in a debate round. Immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    claim: String,
    evidence: Vec<String>,
    reasoning: String,
    confidence: f64,
}

impl Argument {
    /// Build an argument. Confidence is clamped to `[0, 1]`; NaN becomes 0.
    pub fn new(
        claim: impl Into<String>,
        evidence: Vec<String>,
        reasoning: impl Into<String>,
        confidence: f64,
    ) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            claim: claim.into(),
            evidence,
            reasoning: reasoning.into(),
            confidence,
        }
    }

    pub fn claim(&self) -> &str {
        &self.claim
    }

    /// Ordered supporting evidence
    pub fn evidence(&self) -> &[String] {
        &self.evidence
    }

    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }
}
