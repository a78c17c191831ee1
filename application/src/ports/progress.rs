//! Progress notification port
//!
//! Defines the interface for reporting progress while a task is processed.

use tandem_domain::{RoutingDecision, WorkflowOutcome};

/// Coarse stage of a workflow run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStage {
    Analysing,
    Routing,
    Proposing,
    Reviewing,
    Refining,
    Debating,
    Synthesising,
    Complete,
}

impl WorkflowStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStage::Analysing => "analysing",
            WorkflowStage::Routing => "routing",
            WorkflowStage::Proposing => "proposing",
            WorkflowStage::Reviewing => "reviewing",
            WorkflowStage::Refining => "refining",
            WorkflowStage::Debating => "debating",
            WorkflowStage::Synthesising => "synthesising",
            WorkflowStage::Complete => "complete",
        }
    }
}

/// Callback for progress updates during a workflow run
///
/// Implementations live in the presentation layer.
pub trait WorkflowProgress: Send + Sync {
    /// Called when a stage starts
    fn on_stage(&self, stage: WorkflowStage, detail: &str);

    fn on_routed(&self, _decision: &RoutingDecision) {}

    /// Called when a new candidate enters review
    fn on_iteration(&self, _iteration: usize, _max_iterations: usize) {}

    fn on_debate_round(&self, _round: usize, _max_rounds: usize) {}

    fn on_complete(&self, _outcome: WorkflowOutcome) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl WorkflowProgress for NoProgress {
    fn on_stage(&self, _stage: WorkflowStage, _detail: &str) {}
}
