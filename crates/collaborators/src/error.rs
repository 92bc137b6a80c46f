//! Shared error type for the collaborator interfaces.

use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum CollaboratorError {
    #[error("source control request failed: {0}")]
    SourceControl(String),

    #[error("notification delivery failed: {0}")]
    Notification(String),

    #[error("unknown recipient: {0}")]
    UnknownRecipient(String),

    #[error("user '{0}' not found")]
    UserNotFound(String),

    #[error("user '{0}' has no access token on file")]
    NoAccessToken(String),
}
