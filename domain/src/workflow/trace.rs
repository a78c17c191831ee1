//! Decision trace
//!
//! Every decision the orchestrator makes is recorded as a [`TraceEvent`] in
//! an append-only [`DecisionTrace`]. The trace is handed to the persistence
//! collaborator once the task completes; nothing reads it back.

use super::outcome::WorkflowOutcome;
use crate::core::role::AgentRole;
use crate::core::task::TaskId;
use crate::debate::Resolution;
use crate::routing::RoutingTier;
use crate::solution::{SolutionId, SolutionOrigin};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Agent failure classes, kept apart in the trace even though they are
/// retried the same way
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentErrorKind {
    Unavailable,
    RateLimited,
    ResponseMalformed,
}

impl AgentErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentErrorKind::Unavailable => "unavailable",
            AgentErrorKind::RateLimited => "rate_limited",
            AgentErrorKind::ResponseMalformed => "response_malformed",
        }
    }
}

impl fmt::Display for AgentErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The workflow step an agent call belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    Propose,
    Plan,
    Analyse,
    Compose,
    Direct,
    HeavyAnalysis,
    Validate,
    Review,
    Refine,
    Debate,
    Argue,
    Synthesize,
    ValidateSynthesis,
    Score,
}

impl WorkflowStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStep::Propose => "propose",
            WorkflowStep::Plan => "plan",
            WorkflowStep::Analyse => "analyse",
            WorkflowStep::Compose => "compose",
            WorkflowStep::Direct => "direct",
            WorkflowStep::HeavyAnalysis => "heavy_analysis",
            WorkflowStep::Validate => "validate",
            WorkflowStep::Review => "review",
            WorkflowStep::Refine => "refine",
            WorkflowStep::Debate => "debate",
            WorkflowStep::Argue => "argue",
            WorkflowStep::Synthesize => "synthesize",
            WorkflowStep::ValidateSynthesis => "validate_synthesis",
            WorkflowStep::Score => "score",
        }
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a task ended `Failed`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FailureReason {
    /// An agent call failed on its retry too
    Agent {
        role: AgentRole,
        kind: AgentErrorKind,
        message: String,
    },
    /// Budget exceeded under a policy requiring override
    BudgetExceeded { used: u64, limit: u64 },
    /// The debate could not pick a winner (its fallback evaluation failed)
    Evaluation { message: String },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Agent {
                role,
                kind,
                message,
            } => write!(f, "{} agent {}: {}", role, kind, message),
            FailureReason::BudgetExceeded { used, limit } => {
                write!(f, "budget exceeded ({} of {} units)", used, limit)
            }
            FailureReason::Evaluation { message } => write!(f, "evaluation failed: {}", message),
        }
    }
}

/// Where and why a task failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureReport {
    pub step: WorkflowStep,
    #[serde(flatten)]
    pub reason: FailureReason,
}

impl fmt::Display for FailureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} step failed: {}", self.step, self.reason)
    }
}

/// One recorded decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceEvent {
    TaskReceived {
        goal: String,
        context_blobs: usize,
        continues: Option<TaskId>,
    },
    Routed {
        tier: RoutingTier,
        size: u64,
        requires_split: bool,
    },
    CacheHit {
        fingerprint: u64,
    },
    CandidateProduced {
        iteration: usize,
        solution_id: SolutionId,
        author: AgentRole,
        origin: SolutionOrigin,
    },
    CritiqueReceived {
        iteration: usize,
        solution_id: SolutionId,
        reviewer: AgentRole,
        blocking_issues: usize,
        advisory_issues: usize,
        has_alternative: bool,
    },
    RefinementRequested {
        iteration: usize,
    },
    Escalated {
        iteration: usize,
        candidate: SolutionId,
        alternative: SolutionId,
    },
    DebateConcluded {
        resolution: Resolution,
        rounds_completed: usize,
        final_solution: SolutionId,
    },
    AgentCallFailed {
        step: WorkflowStep,
        role: AgentRole,
        kind: AgentErrorKind,
        attempt: u32,
        message: String,
    },
    BudgetExceeded {
        used: u64,
        limit: u64,
        overridden: bool,
    },
    Completed {
        outcome: WorkflowOutcome,
        iterations: usize,
        approved: bool,
    },
    Failed {
        report: FailureReport,
    },
}

impl TraceEvent {
    /// Snake-case name of the event variant
    pub fn kind(&self) -> &'static str {
        match self {
            TraceEvent::TaskReceived { .. } => "task_received",
            TraceEvent::Routed { .. } => "routed",
            TraceEvent::CacheHit { .. } => "cache_hit",
            TraceEvent::CandidateProduced { .. } => "candidate_produced",
            TraceEvent::CritiqueReceived { .. } => "critique_received",
            TraceEvent::RefinementRequested { .. } => "refinement_requested",
            TraceEvent::Escalated { .. } => "escalated",
            TraceEvent::DebateConcluded { .. } => "debate_concluded",
            TraceEvent::AgentCallFailed { .. } => "agent_call_failed",
            TraceEvent::BudgetExceeded { .. } => "budget_exceeded",
            TraceEvent::Completed { .. } => "completed",
            TraceEvent::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    /// 0-based position in the trace
    pub sequence: u64,
    pub at: DateTime<Utc>,
    pub event: TraceEvent,
}

/// Ordered, append-only record of one task's decisions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTrace {
    task_id: TaskId,
    entries: Vec<TraceEntry>,
}

impl DecisionTrace {
    pub fn new(task_id: TaskId) -> Self {
        Self {
            task_id,
            entries: Vec::new(),
        }
    }

    pub fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    /// Append an event stamped with the current time
    pub fn record(&mut self, event: TraceEvent) {
        let sequence = self.entries.len() as u64;
        self.entries.push(TraceEntry {
            sequence,
            at: Utc::now(),
            event,
        });
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    pub fn events(&self) -> impl Iterator<Item = &TraceEvent> {
        self.entries.iter().map(|e| &e.event)
    }

    /// Number of events of the given kind (see [`TraceEvent::kind`])
    pub fn count(&self, kind: &str) -> usize {
        self.events().filter(|e| e.kind() == kind).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_numbers_follow_insertion_order() {
        let mut trace = DecisionTrace::new(TaskId::new("t-1"));
        trace.record(TraceEvent::Routed {
            tier: RoutingTier::Bounded,
            size: 10,
            requires_split: false,
        });
        trace.record(TraceEvent::RefinementRequested { iteration: 1 });
        trace.record(TraceEvent::RefinementRequested { iteration: 2 });

        let sequences: Vec<u64> = trace.entries().iter().map(|e| e.sequence).collect();
        assert_eq!(sequences, vec![0, 1, 2]);
        assert!(trace.entries()[0].at <= trace.entries()[2].at);
        assert_eq!(trace.count("refinement_requested"), 2);
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = TraceEvent::AgentCallFailed {
            step: WorkflowStep::Review,
            role: AgentRole::Auxiliary,
            kind: AgentErrorKind::RateLimited,
            attempt: 1,
            message: "429".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "agent_call_failed");
        assert_eq!(json["kind"], "rate_limited");
        assert_eq!(json["step"], "review");
        assert_eq!(event.kind(), "agent_call_failed");
    }

    #[test]
    fn test_failure_report_display() {
        let report = FailureReport {
            step: WorkflowStep::Propose,
            reason: FailureReason::Agent {
                role: AgentRole::Primary,
                kind: AgentErrorKind::Unavailable,
                message: "connection refused".to_string(),
            },
        };
        assert_eq!(
            report.to_string(),
            "propose step failed: primary agent unavailable: connection refused"
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["reason"], "agent");
        assert_eq!(json["step"], "propose");
    }
}
