//! Terminal outcomes of a workflow run

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a task ended. Every result carries one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowOutcome {
    /// The reviewer reported no blocking issues
    Accepted,
    /// `max_iterations` reached without acceptance; the last candidate is
    /// returned unapproved
    Exhausted,
    /// A disagreement was settled by debate
    EscalatedToDebate,
    /// An agent call failed twice or the budget was exceeded without override
    Failed,
}

impl WorkflowOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowOutcome::Accepted => "accepted",
            WorkflowOutcome::Exhausted => "exhausted",
            WorkflowOutcome::EscalatedToDebate => "escalated_to_debate",
            WorkflowOutcome::Failed => "failed",
        }
    }

    /// Process exit code for this outcome
    pub fn exit_code(&self) -> i32 {
        match self {
            WorkflowOutcome::Accepted | WorkflowOutcome::EscalatedToDebate => 0,
            WorkflowOutcome::Exhausted => 2,
            WorkflowOutcome::Failed => 3,
        }
    }

    /// Whether the returned solution can be used as-is
    pub fn is_success(&self) -> bool {
        self.exit_code() == 0
    }
}

impl fmt::Display for WorkflowOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(WorkflowOutcome::Accepted.exit_code(), 0);
        assert_eq!(WorkflowOutcome::EscalatedToDebate.exit_code(), 0);
        assert_ne!(WorkflowOutcome::Exhausted.exit_code(), 0);
        assert_ne!(WorkflowOutcome::Failed.exit_code(), 0);
        assert!(!WorkflowOutcome::Exhausted.is_success());
    }
}
