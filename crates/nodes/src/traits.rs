//! The `ExecutableNode` trait — the contract every node handler fulfills.

use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use uuid::Uuid;

use ai::AiAdapter;
use collaborators::{Notifier, SourceControl, UserStore};
use tools::ToolAdapter;

use crate::result::NodeResult;
use crate::NodeError;

/// A single step in the workflow graph, as the handler registry sees it.
///
/// Lives in the `nodes` crate (rather than `engine`, which owns the
/// aggregate `Workflow`/`Edge` types) because the `ExecutableNode` contract
/// is defined here and needs it; `engine` re-exports this type so callers
/// see one `NodeDefinition` name throughout.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct NodeDefinition {
    /// Unique identifier within the workflow (referenced by edges).
    pub id: String,
    /// Tag drawn from the closed set of built-in node types.
    pub node_type: String,
    /// Arbitrary handler configuration.
    pub data: Value,
}

/// Process-local, node-id-keyed result mapping — the Result Store.
/// `IndexMap` so iteration order equals insertion order, which the
/// controller guarantees is topological order — this is what makes
/// [`crate::result::NodeResult::target`] propagation deterministic.
pub type ResultStore = IndexMap<String, NodeResult>;

/// The external collaborators every handler may need. Built once
/// per process and shared via `Arc` across concurrent executions.
pub struct HandlerDeps {
    pub tools: Arc<dyn ToolAdapter>,
    pub ai: Arc<AiAdapter>,
    pub source_control: Arc<dyn SourceControl>,
    pub notifier: Arc<dyn Notifier>,
    pub users: Arc<dyn UserStore>,
}

/// Shared context passed to every node during execution.
#[derive(Clone)]
pub struct ExecutionContext {
    /// ID of the parent workflow.
    pub workflow_id: Uuid,
    /// ID of the current execution run.
    pub execution_id: Uuid,
    /// Principal on whose behalf the execution runs; handlers
    /// resolve credentials through `deps.users` keyed on this.
    pub owner: String,
    pub deps: Arc<HandlerDeps>,
}

/// The core node trait. All built-in handlers implement this.
#[async_trait]
pub trait ExecutableNode: Send + Sync {
    /// Execute the node given its own definition and every prior node's
    /// result (in topological order), and return this node's result.
    async fn execute(
        &self,
        node: &NodeDefinition,
        prior_results: &ResultStore,
        ctx: &ExecutionContext,
    ) -> Result<NodeResult, NodeError>;
}
