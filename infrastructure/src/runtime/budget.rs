//! Process-wide budget tracker

use std::sync::Mutex;
use tandem_application::{BudgetStatus, BudgetTracker, BudgetUsage};
use tandem_domain::{AgentRole, TaskId};
use tracing::debug;

/// Usage counter shared by every task of a process
pub struct SharedBudgetTracker {
    limit: Option<u64>,
    usage: Mutex<BudgetUsage>,
}

impl SharedBudgetTracker {
    pub fn new(limit: Option<u64>) -> Self {
        Self {
            limit,
            usage: Mutex::new(BudgetUsage::default()),
        }
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }
}

impl BudgetTracker for SharedBudgetTracker {
    fn record(&self, task_id: &TaskId, role: AgentRole, units: u64) -> BudgetStatus {
        let mut usage = self
            .usage
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let counter = match role {
            AgentRole::Primary => &mut usage.primary,
            AgentRole::Auxiliary => &mut usage.auxiliary,
        };
        *counter = counter.saturating_add(units);
        debug!("{} charged {} units to {} ({} total)", task_id, units, role, usage.total());

        BudgetStatus {
            used: usage.total(),
            limit: self.limit,
        }
    }

    fn status(&self) -> BudgetStatus {
        BudgetStatus {
            used: self.usage().total(),
            limit: self.limit,
        }
    }

    fn usage(&self) -> BudgetUsage {
        *self
            .usage
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
