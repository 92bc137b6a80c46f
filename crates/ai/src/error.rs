//! Error type for the AI adapter.

use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum AiError {
    /// Neither the primary nor the secondary provider has credentials.
    #[error("no AI provider configured")]
    NoProviderConfigured,

    /// Every configured provider rejected or failed the request.
    #[error("AI provider '{provider}' failed: {message}")]
    ProviderFailed { provider: String, message: String },
}
