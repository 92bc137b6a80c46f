//! Provider strategies for the AI Adapter's primary→secondary fallback chain.

use async_trait::async_trait;
use serde_json::json;
use tracing::warn;

use crate::error::AiError;

/// A single LLM backend the adapter can delegate a prompt to.
#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Human-readable name used in logs and error messages.
    fn name(&self) -> &str;

    /// Whether this provider has the credentials it needs to be tried.
    fn is_configured(&self) -> bool;

    /// Send `prompt` and return the raw text completion.
    async fn complete(&self, prompt: &str) -> Result<String, AiError>;
}

/// OpenAI-compatible chat completions provider.
pub struct OpenAiProvider {
    api_key: Option<String>,
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OpenAiProvider {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            client: reqwest::Client::new(),
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            model: std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
        }
    }
}

#[async_trait]
impl AiProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(&self, prompt: &str) -> Result<String, AiError> {
        let api_key = self.api_key.as_ref().ok_or(AiError::NoProviderConfigured)?;

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&json!({
                "model": self.model,
                "messages": [{"role": "user", "content": prompt}],
            }))
            .send()
            .await
            .map_err(|e| AiError::ProviderFailed {
                provider: self.name().to_string(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(provider = self.name(), %status, "non-2xx response");
            return Err(AiError::ProviderFailed {
                provider: self.name().to_string(),
                message: format!("HTTP {status}"),
            });
        }

        let body: serde_json::Value = response.json().await.map_err(|e| AiError::ProviderFailed {
            provider: self.name().to_string(),
            message: e.to_string(),
        })?;

        body["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| AiError::ProviderFailed {
                provider: self.name().to_string(),
                message: "missing choices[0].message.content in response".to_string(),
            })
    }
}

/// Anthropic Messages API provider.
pub struct AnthropicProvider {
    api_key: Option<String>,
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl AnthropicProvider {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("ANTHROPIC_API_KEY").ok(),
            client: reqwest::Client::new(),
            base_url: std::env::var("ANTHROPIC_BASE_URL")
                .unwrap_or_else(|_| "https://api.anthropic.com/v1".to_string()),
            model: std::env::var("ANTHROPIC_MODEL")
                .unwrap_or_else(|_| "claude-3-5-sonnet-latest".to_string()),
        }
    }
}

#[async_trait]
impl AiProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(&self, prompt: &str) -> Result<String, AiError> {
        let api_key = self.api_key.as_ref().ok_or(AiError::NoProviderConfigured)?;

        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&json!({
                "model": self.model,
                "max_tokens": 2048,
                "messages": [{"role": "user", "content": prompt}],
            }))
            .send()
            .await
            .map_err(|e| AiError::ProviderFailed {
                provider: self.name().to_string(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(provider = self.name(), %status, "non-2xx response");
            return Err(AiError::ProviderFailed {
                provider: self.name().to_string(),
                message: format!("HTTP {status}"),
            });
        }

        let body: serde_json::Value = response.json().await.map_err(|e| AiError::ProviderFailed {
            provider: self.name().to_string(),
            message: e.to_string(),
        })?;

        body["content"][0]["text"]
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| AiError::ProviderFailed {
                provider: self.name().to_string(),
                message: "missing content[0].text in response".to_string(),
            })
    }
}
