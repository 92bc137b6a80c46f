//! Engine-level error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A node lacks `id`/`type`, an edge references an unknown node, or the
    /// definition is otherwise structurally invalid.
    #[error("malformed workflow: {0}")]
    MalformedWorkflow(String),

    /// The scheduler's in-degree walk didn't visit every node.
    #[error("workflow graph contains a cycle")]
    CyclicWorkflow,

    /// A handler returned [`nodes::NodeError`]; the execution moves straight
    /// to `failed`.
    #[error("node '{node_id}' failed: {source}")]
    NodeFailed {
        node_id: String,
        #[source]
        source: nodes::NodeError,
    },

    #[error("database error: {0}")]
    Database(#[from] db::DbError),
}
