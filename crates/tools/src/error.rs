//! Error type for the external tool adapter.

use thiserror::Error;

/// Errors surfaced when invoking a scanner tool.
#[derive(Debug, Error, Clone)]
pub enum ToolError {
    /// The tool ran but exited outside its documented success set.
    #[error("tool '{tool}' exited with code {code}: {output}")]
    InvocationFailed {
        tool: String,
        code: i32,
        output: String,
    },

    /// The tool could not be spawned at all (not a missing-binary case —
    /// that falls back to the mock path; this is e.g. a permissions error).
    #[error("failed to spawn tool '{tool}': {message}")]
    SpawnFailed { tool: String, message: String },
}
