//! Result cache port

use tandem_domain::WorkflowResult;

/// Cache of completed results keyed by task fingerprint
/// (see [`tandem_domain::Task::fingerprint`]).
///
/// Shared across concurrent tasks; implementations serialise access.
pub trait ResultCache: Send + Sync {
    fn get(&self, fingerprint: u64) -> Option<WorkflowResult>;

    fn put(&self, fingerprint: u64, result: WorkflowResult);
}
