//! Consensus and stalemate detection
//!
//! Both checks are pure functions over arguments and rounds. All thresholds
//! are required configuration (see [`ConvergenceThresholds`]); the defaults
//! are documented starting points, not derived values.

use super::argument::Argument;
use super::similarity::{LexicalSimilarity, SimilarityMeasure, evidence_overlap};
use super::transcript::{DebateRound, DebateSide};
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Thresholds for consensus and stalemate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceThresholds {
    /// Claims more similar than this count as the same position
    pub claim_similarity: f64,
    /// Both confidences below this count as both sides conceding
    pub low_confidence: f64,
    /// Evidence overlap above this counts as shared ground
    pub evidence_overlap: f64,
    /// A side whose claim is more similar than this to its previous claim
    /// has not moved
    pub stalemate_similarity: f64,
}

impl Default for ConvergenceThresholds {
    fn default() -> Self {
        Self {
            claim_similarity: 0.85,
            low_confidence: 0.3,
            evidence_overlap: 0.7,
            stalemate_similarity: 0.95,
        }
    }
}

impl ConvergenceThresholds {
    /// Every threshold must lie in `[0, 1]`
    pub fn validate(&self) -> Result<(), DomainError> {
        for (name, value) in [
            ("claim_similarity", self.claim_similarity),
            ("low_confidence", self.low_confidence),
            ("evidence_overlap", self.evidence_overlap),
            ("stalemate_similarity", self.stalemate_similarity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(DomainError::configuration(format!(
                    "debate.{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Which consensus condition fired
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConsensusReason {
    SimilarClaims { similarity: f64 },
    MutualConcession { confidence_a: f64, confidence_b: f64 },
    SharedEvidence { overlap: f64 },
}

impl fmt::Display for ConsensusReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsensusReason::SimilarClaims { similarity } => {
                write!(f, "similar claims ({:.0}%)", similarity * 100.0)
            }
            ConsensusReason::MutualConcession {
                confidence_a,
                confidence_b,
            } => write!(
                f,
                "both sides conceding (confidence {:.2} / {:.2})",
                confidence_a, confidence_b
            ),
            ConsensusReason::SharedEvidence { overlap } => {
                write!(f, "shared evidence ({:.0}%)", overlap * 100.0)
            }
        }
    }
}

/// Consensus holds if any of:
/// (a) claim similarity above `claim_similarity`,
/// (b) both confidences below `low_confidence`,
/// (c) evidence overlap above `evidence_overlap`.
///
/// Conditions are checked in that order; the first one that holds is
/// reported.
pub fn detect_consensus_with(
    a: &Argument,
    b: &Argument,
    thresholds: &ConvergenceThresholds,
    measure: &dyn SimilarityMeasure,
) -> Option<ConsensusReason> {
    let similarity = measure.similarity(a.claim(), b.claim());
    if similarity > thresholds.claim_similarity {
        return Some(ConsensusReason::SimilarClaims { similarity });
    }

    if a.confidence() < thresholds.low_confidence && b.confidence() < thresholds.low_confidence {
        return Some(ConsensusReason::MutualConcession {
            confidence_a: a.confidence(),
            confidence_b: b.confidence(),
        });
    }

    let overlap = evidence_overlap(a.evidence(), b.evidence());
    if overlap > thresholds.evidence_overlap {
        return Some(ConsensusReason::SharedEvidence { overlap });
    }

    None
}

/// [`detect_consensus_with`] using [`LexicalSimilarity`]
pub fn detect_consensus(
    a: &Argument,
    b: &Argument,
    thresholds: &ConvergenceThresholds,
) -> Option<ConsensusReason> {
    detect_consensus_with(a, b, thresholds, &LexicalSimilarity)
}

/// Stalemate: both sides' latest claims are nearly unchanged from their own
/// claims in the previous round. Never fires with fewer than two rounds.
pub fn detect_stalemate_with(
    history: &[DebateRound],
    thresholds: &ConvergenceThresholds,
    measure: &dyn SimilarityMeasure,
) -> bool {
    let [.., previous, latest] = history else {
        return false;
    };

    [DebateSide::A, DebateSide::B].iter().all(|side| {
        let before = previous.argument(*side).claim();
        let now = latest.argument(*side).claim();
        measure.similarity(before, now) > thresholds.stalemate_similarity
    })
}

/// [`detect_stalemate_with`] using [`LexicalSimilarity`]
pub fn detect_stalemate(history: &[DebateRound], thresholds: &ConvergenceThresholds) -> bool {
    detect_stalemate_with(history, thresholds, &LexicalSimilarity)
}
