//! Solutions and critiques
//!
//! Solutions are immutable: refining one produces a new [`Solution`] with a
//! new id and provenance. A [`Critique`] always refers to exactly one
//! solution by id.

pub mod entities;
pub mod request;

pub use entities::{Critique, Issue, Provenance, Severity, Solution, SolutionId, SolutionOrigin};
pub use request::{CritiqueContext, CritiqueFocus, ProposalContext, ProposalStage};
