//! OpenAI-compatible chat completions gateway
//!
//! Works with any server that speaks `POST {base_url}/chat/completions`:
//! vLLM, llama.cpp, OpenAI, and Gemini's OpenAI-compatible endpoint.

use crate::config::FileAgentEndpoint;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tandem_application::{AgentError, GatewayInfo, LlmGateway};
use thiserror::Error;
use tracing::{debug, warn};

/// Longest slice of an error body carried into an [`AgentError`]
const ERROR_BODY_CHARS: usize = 300;

#[derive(Error, Debug)]
pub enum GatewayBuildError {
    #[error("Invalid base URL '{0}'")]
    InvalidBaseUrl(String),

    #[error("Could not build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiCompatibleGateway {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
    max_tokens: u32,
    context_limit: u64,
}

impl OpenAiCompatibleGateway {
    pub fn from_endpoint(endpoint: &FileAgentEndpoint) -> Result<Self, GatewayBuildError> {
        let base_url = endpoint.base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(GatewayBuildError::InvalidBaseUrl(endpoint.base_url.clone()));
        }

        let mut builder = Client::builder();
        if let Some(seconds) = endpoint.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
            model: endpoint.model.clone(),
            api_key: endpoint.resolve_api_key(),
            temperature: endpoint.temperature,
            max_tokens: endpoint.max_tokens,
            context_limit: endpoint.context_limit,
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(ERROR_BODY_CHARS) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

/// Map a non-success HTTP status to the agent error the workflow retries on
fn status_error(status: StatusCode, body: &str) -> AgentError {
    let message = format!("HTTP {}: {}", status.as_u16(), snippet(body));
    if status == StatusCode::TOO_MANY_REQUESTS {
        AgentError::RateLimited(message)
    } else {
        AgentError::Unavailable(message)
    }
}

fn transport_error(err: reqwest::Error) -> AgentError {
    if err.is_timeout() {
        AgentError::Unavailable(format!("request timed out: {}", err))
    } else if err.is_connect() {
        AgentError::Unavailable(format!("connection failed: {}", err))
    } else {
        AgentError::Unavailable(err.to_string())
    }
}

/// Text of the first choice
fn completion_text(body: &str) -> Result<String, AgentError> {
    let response: ChatResponse = serde_json::from_str(body).map_err(|e| {
        AgentError::ResponseMalformed(format!("invalid completion body: {}", e))
    })?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| AgentError::ResponseMalformed("completion has no content".to_string()))
}

#[async_trait]
impl LlmGateway for OpenAiCompatibleGateway {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, AgentError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let url = format!("{}/chat/completions", self.base_url);
        debug!("POST {} ({})", url, self.model);
        let response = self
            .authorize(self.client.post(&url))
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        if !status.is_success() {
            warn!("{} answered {}", self.model, status);
            return Err(status_error(status, &body));
        }
        completion_text(&body)
    }

    async fn health(&self) -> Result<(), AgentError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(status_error(status, &body))
        }
    }

    fn describe(&self) -> GatewayInfo {
        GatewayInfo {
            provider: "openai_compatible".to_string(),
            model: self.model.clone(),
            endpoint: self.base_url.clone(),
            context_limit: self.context_limit,
        }
    }
}
