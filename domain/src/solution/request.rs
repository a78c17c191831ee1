//! What an agent is being asked for
//!
//! The same `propose` / `critique` capabilities serve several workflow
//! steps. These contexts tell the agent which step it is serving and how
//! much of the task's context it is expected to hold.

use super::entities::Solution;
use serde::{Deserialize, Serialize};

/// The step a `propose` call serves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum ProposalStage {
    /// Answer the task directly
    Draft,
    /// Break the task down into a plan for a full-context analyst
    Plan,
    /// Analyse the full context against the primary's plan
    Analysis { plan: Solution },
    /// Set the direction for heavy analysis of a large context
    Direction,
    /// Carry out the heavy analysis the primary directed
    HeavyAnalysis { direction: Solution },
}

impl ProposalStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStage::Draft => "draft",
            ProposalStage::Plan => "plan",
            ProposalStage::Analysis { .. } => "analysis",
            ProposalStage::Direction => "direction",
            ProposalStage::HeavyAnalysis { .. } => "heavy_analysis",
        }
    }
}

/// Input to `propose` beyond the task itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalContext {
    pub stage: ProposalStage,
    pub iteration: usize,
    /// Whether the caller holds the whole context (otherwise a preview)
    pub full_context: bool,
}

impl ProposalContext {
    pub fn new(stage: ProposalStage, iteration: usize, full_context: bool) -> Self {
        Self {
            stage,
            iteration,
            full_context,
        }
    }
}

/// What a `critique` call checks for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "focus", rename_all = "snake_case")]
pub enum CritiqueFocus {
    /// Ordinary review of a candidate
    Review,
    /// Primary validating the auxiliary's heavy analysis
    Validation,
    /// Checking a debate synthesis against every concern raised
    SynthesisCheck { concerns: Vec<String> },
}

/// Input to `critique` beyond the task and solution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CritiqueContext {
    pub focus: CritiqueFocus,
    pub iteration: usize,
    pub full_context: bool,
}

impl CritiqueContext {
    pub fn review(iteration: usize, full_context: bool) -> Self {
        Self {
            focus: CritiqueFocus::Review,
            iteration,
            full_context,
        }
    }

    pub fn validation(iteration: usize) -> Self {
        Self {
            focus: CritiqueFocus::Validation,
            iteration,
            full_context: false,
        }
    }

    pub fn synthesis_check(concerns: Vec<String>) -> Self {
        Self {
            focus: CritiqueFocus::SynthesisCheck { concerns },
            iteration: 0,
            full_context: true,
        }
    }
}
