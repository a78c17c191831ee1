//! LLM Gateway port
//!
//! Defines the interface for sending one prompt to a model provider and
//! receiving its raw text answer.

use super::agent::AgentError;
use async_trait::async_trait;
use serde::Serialize;

/// Static facts about a gateway, shown by `status`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatewayInfo {
    pub provider: String,
    pub model: String,
    pub endpoint: String,
    /// Context window in tokens
    pub context_limit: u64,
}

/// Gateway for LLM communication
///
/// Implementations (adapters) live in the infrastructure layer. Errors are
/// reported in agent terms so that retry and tracing stay uniform.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Send a prompt pair and return the model's text
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, AgentError>;

    /// Check that the provider is reachable
    async fn health(&self) -> Result<(), AgentError>;

    fn describe(&self) -> GatewayInfo;
}
