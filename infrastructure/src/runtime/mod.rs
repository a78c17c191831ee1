//! Shared runtime services injected into the orchestrator
//!
//! - [`SharedBudgetTracker`]: process-wide usage counter
//! - [`MemoryResultCache`]: accepted results keyed by task fingerprint

mod budget;
mod cache;

pub use budget::SharedBudgetTracker;
pub use cache::MemoryResultCache;
