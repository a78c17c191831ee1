//! Application-level configuration.
//!
//! - [`OrchestratorConfig`]: every threshold and limit the use cases consume
//! - [`DebateConfig`], [`EvaluationConfig`]: per-component slices
//! - [`BudgetPolicy`]: what an exceeded budget means for a task

pub mod orchestrator_config;

pub use orchestrator_config::{BudgetPolicy, DebateConfig, EvaluationConfig, OrchestratorConfig};
