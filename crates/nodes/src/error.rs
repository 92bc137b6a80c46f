//! Node-level error type — the closed set of error kinds a handler can fail with.

use thiserror::Error;

/// Errors returned by a node's `execute` method.
///
/// Any variant here moves the owning execution straight to `failed` —
/// there is no retry loop; preemption and distributed scheduling, the two
/// things a retry policy would need to coordinate with, are out of scope.
#[derive(Debug, Error, Clone)]
pub enum NodeError {
    #[error("unknown node type: '{0}'")]
    UnknownNodeType(String),

    #[error("no target available for node")]
    NoTarget,

    #[error("tool invocation failed: {0}")]
    ToolInvocationFailed(String),

    #[error("missing credential for owner")]
    MissingCredential,

    #[error("missing context: {0}")]
    MissingContext(String),

    #[error("no file path inferable from prior results")]
    NoPathInferable,

    #[error("no AI provider configured")]
    NoProviderConfigured,

    #[error("configuration error: {0}")]
    Configuration(String),
}
