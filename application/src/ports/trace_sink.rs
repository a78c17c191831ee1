//! Port for persisting decision traces and debate transcripts.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port receives the
//! machine-readable record of each completed task.

use tandem_domain::{DebateTranscript, DecisionTrace, TaskId, WorkflowOutcome};

/// One record handed to the sink
#[derive(Debug, Clone)]
pub enum TraceRecord {
    /// The full decision trace of a completed task
    Decisions(DecisionTrace),
    /// The transcript of the task's debate
    Debate(DebateTranscript),
    /// Final outcome summary
    Outcome {
        outcome: WorkflowOutcome,
        approved: bool,
        iterations: usize,
    },
}

impl TraceRecord {
    pub fn kind(&self) -> &'static str {
        match self {
            TraceRecord::Decisions(_) => "decision_trace",
            TraceRecord::Debate(_) => "debate_transcript",
            TraceRecord::Outcome { .. } => "outcome",
        }
    }
}

/// Append-only persistence keyed by task id.
///
/// Records for one task arrive in order. `append` is synchronous and
/// infallible from the caller's side; implementations report their own
/// write failures.
pub trait TraceSink: Send + Sync {
    fn append(&self, task_id: &TaskId, record: TraceRecord);
}

/// No-op implementation for tests and when persistence is disabled.
pub struct NoTraceSink;

impl TraceSink for NoTraceSink {
    fn append(&self, _task_id: &TaskId, _record: TraceRecord) {}
}
