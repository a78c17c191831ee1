//! Workflow result returned to callers

use super::outcome::WorkflowOutcome;
use super::trace::{DecisionTrace, FailureReport};
use crate::core::task::TaskId;
use crate::debate::{DebateTranscript, Resolution};
use crate::routing::{RoutingDecision, RoutingTier};
use crate::solution::Solution;
use serde::{Deserialize, Serialize};

/// Everything a caller learns about one processed task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowResult {
    pub task_id: TaskId,
    pub routing: RoutingDecision,
    pub outcome: WorkflowOutcome,
    /// Final candidate. `None` only when the task failed before any
    /// candidate existed or after a failure (never presented as accepted).
    pub solution: Option<Solution>,
    /// `false` for exhausted and failed runs
    pub approved: bool,
    pub iterations: usize,
    pub trace: DecisionTrace,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<DebateTranscript>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureReport>,
}

impl WorkflowResult {
    pub fn mode(&self) -> RoutingTier {
        self.routing.tier
    }

    pub fn exit_code(&self) -> i32 {
        self.outcome.exit_code()
    }

    /// Debate ended through its degraded path
    pub fn debate_aborted(&self) -> bool {
        self.resolution.as_ref().is_some_and(Resolution::is_aborted)
    }

    pub fn content(&self) -> Option<&str> {
        self.solution.as_ref().map(Solution::content)
    }
}
