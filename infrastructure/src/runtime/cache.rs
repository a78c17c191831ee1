//! In-memory result cache

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tandem_application::ResultCache;
use tandem_domain::WorkflowResult;

const DEFAULT_CAPACITY: usize = 64;

#[derive(Default)]
struct Entries {
    results: HashMap<u64, WorkflowResult>,
    /// Insertion order, oldest first
    order: VecDeque<u64>,
}

/// Bounded cache; the oldest entry is evicted first
pub struct MemoryResultCache {
    capacity: usize,
    entries: Mutex<Entries>,
}

impl Default for MemoryResultCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl MemoryResultCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(Entries::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Entries> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ResultCache for MemoryResultCache {
    fn get(&self, fingerprint: u64) -> Option<WorkflowResult> {
        self.lock().results.get(&fingerprint).cloned()
    }

    fn put(&self, fingerprint: u64, result: WorkflowResult) {
        let mut entries = self.lock();
        if entries.results.insert(fingerprint, result).is_none() {
            entries.order.push_back(fingerprint);
        }
        while entries.order.len() > self.capacity {
            if let Some(oldest) = entries.order.pop_front() {
                entries.results.remove(&oldest);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_domain::{
        DecisionTrace, RoutingDecision, RoutingTier, TaskId, WorkflowOutcome,
    };

    fn result(id: &str) -> WorkflowResult {
        WorkflowResult {
            task_id: TaskId::new(id),
            routing: RoutingDecision {
                tier: RoutingTier::Bounded,
                size: 10,
            },
            outcome: WorkflowOutcome::Accepted,
            solution: None,
            approved: true,
            iterations: 1,
            trace: DecisionTrace::new(TaskId::new(id)),
            transcript: None,
            resolution: None,
            failure: None,
        }
    }

    #[test]
    fn test_get_returns_stored_result() {
        let cache = MemoryResultCache::default();
        cache.put(7, result("a"));
        assert_eq!(cache.get(7).map(|r| r.task_id), Some(TaskId::new("a")));
        assert!(cache.get(8).is_none());
    }

    #[test]
    fn test_oldest_entry_evicted() {
        let cache = MemoryResultCache::with_capacity(2);
        cache.put(1, result("a"));
        cache.put(2, result("b"));
        cache.put(1, result("a2"));
        cache.put(3, result("c"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(1).is_none());
        assert!(cache.get(2).is_some());
        assert!(cache.get(3).is_some());
    }
}
