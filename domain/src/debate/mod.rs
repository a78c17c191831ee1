//! Structured debate between the two agents
//!
//! When a reviewer both blocks a candidate and offers an alternative, the
//! two solutions are argued round by round:
//!
//! ```text
//! round n:  primary ──argue(A)──┐
//!                               ├─▶ DebateRound ─▶ consensus? stalemate? cap?
//!           auxiliary ─argue(B)─┘        │
//!                                        ▼
//!                                 DebateTranscript (append-only)
//! ```
//!
//! This module holds the data and the pure convergence checks; the
//! round loop itself lives in the application layer.

pub mod argument;
pub mod convergence;
pub mod outcome;
pub mod similarity;
pub mod transcript;

pub use argument::Argument;
pub use convergence::{
    ConsensusReason, ConvergenceThresholds, detect_consensus, detect_consensus_with,
    detect_stalemate, detect_stalemate_with,
};
pub use outcome::{DebateOutcome, Resolution};
pub use similarity::{LexicalSimilarity, SimilarityMeasure, evidence_overlap};
pub use transcript::{DebateRound, DebateSide, DebateTranscript};
