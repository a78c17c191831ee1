//! Agent endpoint configuration from TOML (`[agents.primary]` and
//! `[agents.auxiliary]`)
//!
//! Both agents talk to an OpenAI-compatible chat completions endpoint. The
//! defaults point the primary agent at a local vLLM server and the auxiliary
//! agent at Gemini's OpenAI-compatible API.

use serde::{Deserialize, Serialize};
use tandem_domain::{AgentRole, DomainError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentEndpoint {
    /// Base URL up to and including the API version, e.g. `http://localhost:8000/v1`
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: Option<String>,
    /// Direct API key (not recommended; use `api_key_env`)
    pub api_key: Option<String>,
    /// Context window in tokens
    pub context_limit: u64,
    pub temperature: f32,
    pub max_tokens: u32,
    /// HTTP timeout; the workflow call timeout still applies on top
    pub timeout_seconds: Option<u64>,
}

impl Default for FileAgentEndpoint {
    fn default() -> Self {
        Self::primary()
    }
}

impl FileAgentEndpoint {
    pub fn primary() -> Self {
        Self {
            base_url: "http://localhost:8000/v1".to_string(),
            model: "AgentFlow/agentflow-planner-7b".to_string(),
            api_key_env: None,
            api_key: None,
            context_limit: 8_000,
            temperature: 0.7,
            max_tokens: 2_048,
            timeout_seconds: None,
        }
    }

    pub fn auxiliary() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            model: "gemini-2.5-pro".to_string(),
            api_key_env: Some("GEMINI_API_KEY".to_string()),
            api_key: None,
            context_limit: 2_000_000,
            temperature: 0.7,
            max_tokens: 8_192,
            timeout_seconds: None,
        }
    }

    /// The configured key, or the one in `api_key_env`
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key.clone().or_else(|| {
            self.api_key_env
                .as_deref()
                .and_then(|name| std::env::var(name).ok())
                .filter(|key| !key.trim().is_empty())
        })
    }

    pub fn validate(&self, role: AgentRole) -> Result<(), DomainError> {
        if self.base_url.trim().is_empty() {
            return Err(DomainError::configuration(format!(
                "agents.{}.base_url cannot be empty",
                role
            )));
        }
        if self.model.trim().is_empty() {
            return Err(DomainError::configuration(format!(
                "agents.{}.model cannot be empty",
                role
            )));
        }
        if self.timeout_seconds == Some(0) {
            return Err(DomainError::configuration(format!(
                "agents.{}.timeout_seconds cannot be 0",
                role
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentsConfig {
    pub primary: FileAgentEndpoint,
    pub auxiliary: FileAgentEndpoint,
}

impl Default for FileAgentsConfig {
    fn default() -> Self {
        Self {
            primary: FileAgentEndpoint::primary(),
            auxiliary: FileAgentEndpoint::auxiliary(),
        }
    }
}

impl FileAgentsConfig {
    pub fn endpoint(&self, role: AgentRole) -> &FileAgentEndpoint {
        match role {
            AgentRole::Primary => &self.primary,
            AgentRole::Auxiliary => &self.auxiliary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_key_wins_over_env() {
        let endpoint = FileAgentEndpoint {
            api_key: Some("sk-direct".to_string()),
            api_key_env: Some("TANDEM_TEST_UNSET_KEY".to_string()),
            ..FileAgentEndpoint::primary()
        };
        assert_eq!(endpoint.resolve_api_key(), Some("sk-direct".to_string()));
    }

    #[test]
    fn test_empty_model_rejected() {
        let endpoint = FileAgentEndpoint {
            model: " ".to_string(),
            ..FileAgentEndpoint::auxiliary()
        };
        let err = endpoint.validate(AgentRole::Auxiliary).unwrap_err();
        assert!(err.to_string().contains("agents.auxiliary.model"));
    }
}
