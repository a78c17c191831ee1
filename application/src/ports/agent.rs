//! Agent port
//!
//! The capability contract the orchestration core requires from each of the
//! two collaborators. Implementations return parsed domain types only; raw
//! model text never crosses this boundary.

use async_trait::async_trait;
use std::time::Duration;
use tandem_domain::{
    AgentErrorKind, AgentRole, Argument, Criterion, Critique, CritiqueContext, DebateTranscript,
    EvaluationScore, ParseError, ProposalContext, Solution, Task,
};
use thiserror::Error;

/// Errors an agent call can fail with.
///
/// All three are retried the same way; the trace keeps them apart.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AgentError {
    #[error("Agent unavailable: {0}")]
    Unavailable(String),

    #[error("Agent rate limited: {0}")]
    RateLimited(String),

    #[error("Malformed agent response: {0}")]
    ResponseMalformed(String),
}

impl AgentError {
    pub fn kind(&self) -> AgentErrorKind {
        match self {
            AgentError::Unavailable(_) => AgentErrorKind::Unavailable,
            AgentError::RateLimited(_) => AgentErrorKind::RateLimited,
            AgentError::ResponseMalformed(_) => AgentErrorKind::ResponseMalformed,
        }
    }

    /// A call that did not answer within its timeout
    pub fn timed_out(after: Duration) -> Self {
        AgentError::Unavailable(format!("no response within {:?}", after))
    }

    pub fn message(&self) -> &str {
        match self {
            AgentError::Unavailable(m)
            | AgentError::RateLimited(m)
            | AgentError::ResponseMalformed(m) => m,
        }
    }
}

impl From<ParseError> for AgentError {
    fn from(err: ParseError) -> Self {
        AgentError::ResponseMalformed(err.to_string())
    }
}

/// One of the two collaborators
#[async_trait]
pub trait Agent: Send + Sync {
    fn role(&self) -> AgentRole;

    /// Display name (usually the model)
    fn name(&self) -> &str;

    async fn propose(&self, task: &Task, ctx: &ProposalContext) -> Result<Solution, AgentError>;

    async fn critique(
        &self,
        task: &Task,
        solution: &Solution,
        ctx: &CritiqueContext,
    ) -> Result<Critique, AgentError>;

    async fn refine(
        &self,
        task: &Task,
        solution: &Solution,
        critique: &Critique,
    ) -> Result<Solution, AgentError>;

    async fn argue(
        &self,
        task: &Task,
        own: &Solution,
        opponent: &Solution,
        transcript: &DebateTranscript,
    ) -> Result<Argument, AgentError>;

    /// Combine two solutions. With an empty transcript this composes a plan
    /// and its analysis; otherwise it settles a debate.
    async fn synthesize(
        &self,
        task: &Task,
        a: &Solution,
        b: &Solution,
        transcript: &DebateTranscript,
    ) -> Result<Solution, AgentError>;

    async fn score(
        &self,
        task: &Task,
        solution: &Solution,
        criterion: Criterion,
    ) -> Result<EvaluationScore, AgentError>;

    /// Reachability check; never touches the orchestration core
    async fn health(&self) -> Result<(), AgentError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_are_distinct() {
        assert_eq!(
            AgentError::Unavailable("x".into()).kind(),
            AgentErrorKind::Unavailable
        );
        assert_eq!(
            AgentError::RateLimited("x".into()).kind(),
            AgentErrorKind::RateLimited
        );
        assert_eq!(
            AgentError::ResponseMalformed("x".into()).kind(),
            AgentErrorKind::ResponseMalformed
        );
    }

    #[test]
    fn test_timeout_is_unavailable() {
        let err = AgentError::timed_out(Duration::from_secs(30));
        assert_eq!(err.kind(), AgentErrorKind::Unavailable);
        assert!(err.message().contains("30s"));
    }

    #[test]
    fn test_parse_error_is_malformed() {
        let err: AgentError = ParseError::MissingField("claim").into();
        assert_eq!(err.kind(), AgentErrorKind::ResponseMalformed);
    }
}
