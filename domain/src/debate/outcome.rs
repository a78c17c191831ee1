//! Debate results

use super::convergence::ConsensusReason;
use super::transcript::DebateTranscript;
use crate::solution::Solution;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a debate ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "resolution", rename_all = "snake_case")]
pub enum Resolution {
    /// The sides converged
    Consensus { reason: ConsensusReason },
    /// Neither side moved between two consecutive rounds
    Stalemate,
    /// The round cap was reached
    RoundsExhausted,
    /// A round or the synthesis failed twice; the winner was picked by
    /// evaluation instead of synthesis
    Aborted { reason: String },
}

impl Resolution {
    pub fn is_aborted(&self) -> bool {
        matches!(self, Resolution::Aborted { .. })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Consensus { .. } => "consensus",
            Resolution::Stalemate => "stalemate",
            Resolution::RoundsExhausted => "rounds_exhausted",
            Resolution::Aborted { .. } => "aborted",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Consensus { reason } => write!(f, "consensus: {}", reason),
            Resolution::Stalemate => write!(f, "stalemate"),
            Resolution::RoundsExhausted => write!(f, "rounds exhausted"),
            Resolution::Aborted { reason } => write!(f, "aborted: {}", reason),
        }
    }
}

/// What a debate hands back to the workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateOutcome {
    pub final_solution: Solution,
    pub transcript: DebateTranscript,
    pub resolution: Resolution,
    pub rounds_completed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_serialization() {
        let json = serde_json::to_value(Resolution::Consensus {
            reason: ConsensusReason::SharedEvidence { overlap: 0.8 },
        })
        .unwrap();
        assert_eq!(json["resolution"], "consensus");
        assert_eq!(json["reason"]["kind"], "shared_evidence");

        let aborted = Resolution::Aborted {
            reason: "round 2 failed twice".to_string(),
        };
        assert!(aborted.is_aborted());
        assert_eq!(aborted.to_string(), "aborted: round 2 failed twice");
    }
}
