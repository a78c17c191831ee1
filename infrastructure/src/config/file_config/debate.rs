//! Debate configuration from TOML (`[debate]` section)

use serde::{Deserialize, Serialize};
use tandem_application::DebateConfig;
use tandem_domain::ConvergenceThresholds;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDebateConfig {
    pub max_rounds: usize,
    pub claim_similarity: f64,
    pub low_confidence: f64,
    pub evidence_overlap: f64,
    pub stalemate_similarity: f64,
    /// Have the auxiliary agent check the synthesis
    pub validate_synthesis: bool,
}

impl Default for FileDebateConfig {
    fn default() -> Self {
        let debate = DebateConfig::default();
        let thresholds = debate.thresholds;
        Self {
            max_rounds: debate.max_rounds,
            claim_similarity: thresholds.claim_similarity,
            low_confidence: thresholds.low_confidence,
            evidence_overlap: thresholds.evidence_overlap,
            stalemate_similarity: thresholds.stalemate_similarity,
            validate_synthesis: debate.validate_synthesis,
        }
    }
}

impl FileDebateConfig {
    pub fn to_debate_config(&self) -> DebateConfig {
        DebateConfig {
            max_rounds: self.max_rounds,
            thresholds: ConvergenceThresholds {
                claim_similarity: self.claim_similarity,
                low_confidence: self.low_confidence,
                evidence_overlap: self.evidence_overlap,
                stalemate_similarity: self.stalemate_similarity,
            },
            validate_synthesis: self.validate_synthesis,
        }
    }
}
