//! `ai` crate — the AI Adapter.
//!
//! A single surface over a primary→secondary chain of LLM providers. Every
//! operation builds a prompt from a documented template (`prompts`) and
//! delegates to the first configured provider, falling back to the next on
//! any transport error or non-2xx response.

pub mod error;
pub mod prompts;
pub mod providers;

pub use error::AiError;
pub use providers::{AiProvider, AnthropicProvider, OpenAiProvider};

use tracing::warn;

/// The AI Adapter: tries providers in order until one succeeds.
pub struct AiAdapter {
    providers: Vec<Box<dyn AiProvider>>,
}

impl AiAdapter {
    pub fn new(providers: Vec<Box<dyn AiProvider>>) -> Self {
        Self { providers }
    }

    /// Build the default primary→secondary chain from environment
    /// credentials (`OPENAI_API_KEY` primary, `ANTHROPIC_API_KEY` secondary).
    pub fn from_env() -> Self {
        Self::new(vec![
            Box::new(OpenAiProvider::from_env()),
            Box::new(AnthropicProvider::from_env()),
        ])
    }

    async fn complete(&self, prompt: &str) -> Result<String, AiError> {
        let configured: Vec<&Box<dyn AiProvider>> =
            self.providers.iter().filter(|p| p.is_configured()).collect();

        if configured.is_empty() {
            return Err(AiError::NoProviderConfigured);
        }

        let mut last_err = None;
        for provider in configured {
            match provider.complete(prompt).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    warn!(provider = provider.name(), error = %e, "provider failed, trying next");
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or(AiError::NoProviderConfigured))
    }

    /// Analyze a source file for the single most important vulnerability.
    pub async fn analyze_code(
        &self,
        file_path: &str,
        content: &str,
        context: &str,
    ) -> Result<String, AiError> {
        self.complete(&prompts::analyze_code(file_path, content, context)).await
    }

    /// Summarize scan output into an executive-facing report.
    pub async fn generate_security_recommendations(&self, report: &str) -> Result<String, AiError> {
        self.complete(&prompts::generate_security_recommendations(report)).await
    }

    /// Produce a fixed file body given the original content and a
    /// vulnerability description.
    pub async fn generate_fix(&self, content: &str, vulnerability: &str) -> Result<String, AiError> {
        self.complete(&prompts::generate_fix(content, vulnerability)).await
    }

    /// Generate documentation text summarizing findings for a target.
    pub async fn generate_documentation(&self, target: &str, context: &str) -> Result<String, AiError> {
        self.complete(&prompts::generate_documentation(target, context)).await
    }

    /// Generate a workflow JSON definition from a natural-language request,
    /// stripping a surrounding ```json fence if present.
    pub async fn generate_workflow_json(&self, description: &str) -> Result<String, AiError> {
        let raw = self.complete(&prompts::generate_workflow_json(description)).await?;
        Ok(strip_json_fence(&raw))
    }
}

fn strip_json_fence(text: &str) -> String {
    let trimmed = text.trim();
    if let Some(rest) = trimmed.strip_prefix("```json") {
        let rest = rest.strip_suffix("```").unwrap_or(rest);
        return rest.trim().to_string();
    }
    if let Some(rest) = trimmed.strip_prefix("```") {
        let rest = rest.strip_suffix("```").unwrap_or(rest);
        return rest.trim().to_string();
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fence() {
        let input = "```json\n{\"a\": 1}\n```";
        assert_eq!(strip_json_fence(input), "{\"a\": 1}");
    }

    #[test]
    fn leaves_bare_json_untouched() {
        let input = "{\"a\": 1}";
        assert_eq!(strip_json_fence(input), "{\"a\": 1}");
    }

    #[tokio::test]
    async fn no_provider_configured_when_chain_empty() {
        let adapter = AiAdapter::new(vec![]);
        let result = adapter.generate_documentation("example.com", "ctx").await;
        assert!(matches!(result, Err(AiError::NoProviderConfigured)));
    }
}
