//! Shared utilities for use cases.
//!
//! Every agent call goes through the same discipline: a per-call timeout,
//! one retry on failure, and cancellation at the suspension point.

use crate::ports::agent::AgentError;
use std::future::Future;
use std::time::Duration;
use tandem_domain::{AgentRole, TraceEvent, WorkflowStep};
use tokio_util::sync::CancellationToken;

/// Attempts per call site: the first try plus one retry
pub(crate) const CALL_ATTEMPTS: u32 = 2;

/// Why a guarded call produced no value
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CallError<E> {
    Cancelled,
    /// Failed on every attempt; holds the last error
    Failed(E),
}

/// Run `fut` with a deadline; an elapsed deadline is an unavailable agent
pub(crate) async fn with_timeout<T, F>(timeout: Duration, fut: F) -> Result<T, AgentError>
where
    F: Future<Output = Result<T, AgentError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(AgentError::timed_out(timeout)),
    }
}

/// Trace event for one failed attempt
pub(crate) fn failed_call(
    step: WorkflowStep,
    role: AgentRole,
    attempt: u32,
    err: &AgentError,
) -> TraceEvent {
    TraceEvent::AgentCallFailed {
        step,
        role,
        kind: err.kind(),
        attempt,
        message: err.message().to_string(),
    }
}

/// Run `call`, retrying once with identical inputs.
///
/// `on_failure` sees every failed attempt (1-based) before the next one.
/// Cancellation is checked before each attempt and raced against it; the
/// in-flight call is dropped when the token fires.
pub(crate) async fn retry_once<T, E, F, Fut>(
    cancel: &CancellationToken,
    mut on_failure: impl FnMut(u32, &E),
    mut call: F,
) -> Result<T, CallError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 1;
    loop {
        if cancel.is_cancelled() {
            return Err(CallError::Cancelled);
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CallError::Cancelled),
            result = call() => result,
        };

        match result {
            Ok(value) => return Ok(value),
            Err(err) => {
                on_failure(attempt, &err);
                if attempt >= CALL_ATTEMPTS {
                    return Err(CallError::Failed(err));
                }
                attempt += 1;
            }
        }
    }
}
