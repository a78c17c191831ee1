//! Cost/budget bookkeeping port

use serde::Serialize;
use tandem_domain::{AgentRole, TaskId};

/// Units consumed so far, per agent role
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BudgetUsage {
    pub primary: u64,
    pub auxiliary: u64,
}

impl BudgetUsage {
    pub fn total(&self) -> u64 {
        self.primary.saturating_add(self.auxiliary)
    }

    /// Usage added since the `earlier` snapshot
    pub fn since(&self, earlier: BudgetUsage) -> BudgetUsage {
        BudgetUsage {
            primary: self.primary.saturating_sub(earlier.primary),
            auxiliary: self.auxiliary.saturating_sub(earlier.auxiliary),
        }
    }
}

/// Snapshot of the shared budget after an update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetStatus {
    pub used: u64,
    /// `None` means unlimited
    pub limit: Option<u64>,
}

impl BudgetStatus {
    pub fn is_exceeded(&self) -> bool {
        self.limit.is_some_and(|limit| self.used > limit)
    }
}

/// Process-wide usage counter shared by concurrent tasks.
///
/// Implementations serialise updates: every `record` observes and returns
/// a consistent total.
pub trait BudgetTracker: Send + Sync {
    /// Add `units` consumed by one agent call and return the new status
    fn record(&self, task_id: &TaskId, role: AgentRole, units: u64) -> BudgetStatus;

    fn status(&self) -> BudgetStatus;

    /// Per-role breakdown of `status().used`
    fn usage(&self) -> BudgetUsage;
}
