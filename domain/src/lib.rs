//! Domain layer for tandem
//!
//! This crate contains the core orchestration logic, entities, and value
//! objects. It has no dependencies on infrastructure or presentation
//! concerns and performs no I/O.
//!
//! # Core Concepts
//!
//! ## Routing
//!
//! A task's estimated context size picks one of three tiers:
//!
//! - **Bounded**: the primary agent drafts, the auxiliary reviews
//! - **Collaborative**: the primary plans, the auxiliary analyses the full context
//! - **Delegated**: the auxiliary does the heavy analysis, bracketed by the primary
//!
//! ## Debate
//!
//! Disagreements between the agents are argued round by round until
//! consensus, stalemate or the round cap, then synthesised.
//!
//! ## Evaluation
//!
//! Solutions are scored per criterion and compared by weighted total.

pub mod core;
pub mod debate;
pub mod evaluation;
pub mod parsing;
pub mod prompt;
pub mod routing;
pub mod solution;
pub mod workflow;

// Re-export commonly used types
pub use core::{
    error::DomainError,
    role::AgentRole,
    task::{ContextBlob, ConversationRef, Task, TaskId},
};
pub use debate::{
    Argument, ConsensusReason, ConvergenceThresholds, DebateOutcome, DebateRound, DebateSide,
    DebateTranscript, LexicalSimilarity, Resolution, SimilarityMeasure, detect_consensus,
    detect_consensus_with, detect_stalemate, detect_stalemate_with,
};
pub use evaluation::{
    ComparisonResult, Criterion, CriterionWeights, EvaluationScore, ScoreSet, Verdict,
};
pub use parsing::{ParseError, parse_argument, parse_critique, parse_score, parse_solution};
pub use prompt::PromptTemplate;
pub use routing::{
    ContextBundle, ContextRouter, RoutingDecision, RoutingThresholds, RoutingTier, SplitRange,
    SplitRanges, TierRoles,
};
pub use solution::{
    Critique, CritiqueContext, CritiqueFocus, Issue, ProposalContext, ProposalStage, Provenance,
    Severity, Solution, SolutionId, SolutionOrigin,
};
pub use workflow::{
    AgentErrorKind, DecisionTrace, FailureReason, FailureReport, TraceEntry, TraceEvent,
    WorkflowOutcome, WorkflowResult, WorkflowState, WorkflowStep,
};
