//! Application layer for tandem
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{BudgetPolicy, DebateConfig, EvaluationConfig, OrchestratorConfig};
pub use ports::{
    agent::{Agent, AgentError},
    budget::{BudgetStatus, BudgetTracker, BudgetUsage},
    context_sizer::ContextSizer,
    llm_gateway::{GatewayInfo, LlmGateway},
    progress::{NoProgress, WorkflowProgress, WorkflowStage},
    result_cache::ResultCache,
    trace_sink::{NoTraceSink, TraceRecord, TraceSink},
};
pub use use_cases::debate::{DebateError, DebateManager, DebateRun};
pub use use_cases::evaluate::{EvaluationError, SolutionEvaluator};
pub use use_cases::gateway_agent::GatewayAgent;
pub use use_cases::health::{ComponentHealth, HealthCheck, HealthReport};
pub use use_cases::orchestrate::{WorkflowError, WorkflowOrchestrator};
