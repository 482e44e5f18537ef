//! Agent gateway — invokes one persona against the generative service.
//!
//! The core treats the service as an external collaborator: one call
//! per turn, free-form text back, all failures fatal to the current
//! run. Retry policy, if any, belongs to the collaborator behind this
//! trait, not to the orchestrator.

pub mod prompts;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::conversation::{AgentRole, Turn};
use crate::corpus::Corpus;

/// Errors from gateway invocations. All are fatal to the current run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("gateway unavailable: {0}")]
    Unavailable(String),

    #[error("rate limited by generative service")]
    RateLimited,

    #[error("quota exceeded for generative service")]
    QuotaExceeded,

    #[error("malformed gateway response: {0}")]
    Malformed(String),
}

/// Invokes one persona given the corpus and the conversation so far.
///
/// A successful invocation produces exactly one appended turn; an
/// implementation adding internal retries must still return at most
/// one response per call.
#[async_trait]
pub trait AgentGateway: Send + Sync {
    async fn invoke(
        &self,
        role: AgentRole,
        corpus: &Corpus,
        history: &[Turn],
    ) -> Result<String, GatewayError>;
}

/// Configuration for the HTTP gateway.
#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
    /// OpenAI-compatible chat-completions endpoint.
    pub endpoint: String,
    /// Model identifier passed through to the service.
    pub model: String,
    /// Bearer token.
    pub api_key: String,
    /// Per-invocation deadline; timeouts surface as `Unavailable`.
    pub timeout: Duration,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for HttpGatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://ai.gateway.lovable.dev/v1/chat/completions".to_string(),
            model: "google/gemini-2.5-flash".to_string(),
            api_key: String::new(),
            timeout: Duration::from_secs(120),
            temperature: 0.7,
            max_tokens: 450,
        }
    }
}

/// HTTP implementation of [`AgentGateway`] against an OpenAI-compatible
/// chat-completions API.
pub struct HttpAgentGateway {
    config: HttpGatewayConfig,
    client: reqwest::Client,
}

impl HttpAgentGateway {
    pub fn new(config: HttpGatewayConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");
        Self { config, client }
    }
}

#[async_trait]
impl AgentGateway for HttpAgentGateway {
    async fn invoke(
        &self,
        role: AgentRole,
        corpus: &Corpus,
        history: &[Turn],
    ) -> Result<String, GatewayError> {
        let body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": prompts::system_prompt(role) },
                { "role": "user", "content": prompts::user_prompt(role, corpus, history) },
            ],
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
        });

        debug!(role = %role, turn = history.len() + 1, "invoking persona");

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(GatewayError::RateLimited);
        }
        if status.as_u16() == 402 {
            return Err(GatewayError::QuotaExceeded);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GatewayError::Unavailable(format!("HTTP {}: {}", status, text)));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GatewayError::Malformed(e.to_string()))?;

        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                GatewayError::Malformed("missing choices[0].message.content".to_string())
            })?;

        debug!(role = %role, length = content.len(), "persona responded");
        Ok(content.to_string())
    }
}
