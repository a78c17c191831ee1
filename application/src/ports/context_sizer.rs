//! Context size estimation port

use tandem_domain::Task;

/// Estimates a task's context size in atomic units (tokens)
pub trait ContextSizer: Send + Sync {
    fn estimate(&self, task: &Task) -> u64;
}
