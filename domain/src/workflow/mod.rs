//! Workflow state, outcomes and the decision trace

pub mod outcome;
pub mod result;
pub mod state;
pub mod trace;

pub use outcome::WorkflowOutcome;
pub use result::WorkflowResult;
pub use state::WorkflowState;
pub use trace::{
    AgentErrorKind, DecisionTrace, FailureReason, FailureReport, TraceEntry, TraceEvent,
    WorkflowStep,
};
