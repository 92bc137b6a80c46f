//! Execution Controller — the top-level loop: iterate the topological
//! order, consult the gate evaluator, dispatch the handler, write through
//! to the persistence sink, advance.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{error, info, warn};
use uuid::Uuid;

use ai::AiAdapter;
use nodes::result::{FailedResult, NodeResult, SkippedResult};
use nodes::{ExecutableNode, ExecutionContext, HandlerDeps, NodeError, ResultStore};

use crate::gate::{should_skip, InEdgesIndex};
use crate::models::{ExecutionStatus, Workflow};
use crate::report::build_ai_report;
use crate::EngineError;

/// Where the controller writes execution state as it progresses, one node
/// at a time, rather than as a single batch at the end. `DbSink` is the production
/// implementation; `NullSink` lets the same loop run without Postgres (the
/// `cli run` subcommand, and unit tests).
#[async_trait]
pub trait ExecutionSink: Send + Sync {
    async fn update_status(&self, status: ExecutionStatus, current_node: Option<&str>);
    async fn patch_result(&self, node_id: &str, result: &NodeResult);
    async fn mark_terminal(&self, status: ExecutionStatus, error: Option<&str>);
}

/// Production sink: persists every transition through `db::repository::executions`.
pub struct DbSink {
    pool: db::DbPool,
    execution_id: Uuid,
}

impl DbSink {
    pub fn new(pool: db::DbPool, execution_id: Uuid) -> Self {
        Self { pool, execution_id }
    }
}

#[async_trait]
impl ExecutionSink for DbSink {
    async fn update_status(&self, status: ExecutionStatus, current_node: Option<&str>) {
        if let Err(e) = db::repository::executions::update_status(&self.pool, self.execution_id, &status.to_string(), current_node).await
        {
            warn!(error = %e, "failed to persist status update");
        }
    }

    async fn patch_result(&self, node_id: &str, result: &NodeResult) {
        let value = serde_json::to_value(result).unwrap_or(Value::Null);
        if let Err(e) = db::repository::executions::patch_result(&self.pool, self.execution_id, node_id, &value).await {
            warn!(error = %e, "failed to persist node result");
        }
    }

    async fn mark_terminal(&self, status: ExecutionStatus, error: Option<&str>) {
        if let Err(e) = db::repository::executions::mark_terminal(&self.pool, self.execution_id, &status.to_string(), error).await {
            warn!(error = %e, "failed to persist terminal status");
        }
    }
}

/// No-op sink for the DB-free local `run` path.
#[derive(Default)]
pub struct NullSink;

#[async_trait]
impl ExecutionSink for NullSink {
    async fn update_status(&self, _status: ExecutionStatus, _current_node: Option<&str>) {}
    async fn patch_result(&self, _node_id: &str, _result: &NodeResult) {}
    async fn mark_terminal(&self, _status: ExecutionStatus, _error: Option<&str>) {}
}

/// The outcome of running a workflow's node loop to completion.
pub struct ExecutionOutcome {
    pub status: ExecutionStatus,
    pub results: ResultStore,
    pub error: Option<String>,
}

/// Run the controller lifecycle from `running` through to a terminal
/// status. Persisting the initial pending record and spawning this as a
/// background task are the caller's job, see [`enqueue`].
pub async fn run(
    workflow: &Workflow,
    registry: &nodes::Registry,
    deps: Arc<HandlerDeps>,
    execution_id: Uuid,
    sink: &dyn ExecutionSink,
) -> ExecutionOutcome {
    sink.update_status(ExecutionStatus::Running, None).await;
    info!(workflow_id = %workflow.id, %execution_id, "execution started");

    let sorted_ids = match crate::dag::topological_order(workflow) {
        Ok(ids) => ids,
        Err(e) => {
            let message = e.to_string();
            error!(error = %message, "scheduling failed");
            sink.mark_terminal(ExecutionStatus::Failed, Some(&message)).await;
            return ExecutionOutcome { status: ExecutionStatus::Failed, results: ResultStore::new(), error: Some(message) };
        }
    };

    let in_edges = InEdgesIndex::build(&workflow.edges);
    let node_lookup: std::collections::HashMap<&str, &nodes::NodeDefinition> =
        workflow.nodes.iter().map(|n| (n.id.as_str(), n)).collect();

    let mut results: ResultStore = ResultStore::new();
    let ctx = ExecutionContext {
        workflow_id: workflow.id,
        execution_id,
        owner: workflow.owner.clone(),
        deps: deps.clone(),
    };

    for node_id in &sorted_ids {
        sink.update_status(ExecutionStatus::Running, Some(node_id)).await;

        if let Some(reason) = should_skip(node_id, &in_edges, &results) {
            info!(node_id, reason, "node skipped");
            let result = NodeResult::Skipped(SkippedResult { reason });
            sink.patch_result(node_id, &result).await;
            results.insert(node_id.clone(), result);
            continue;
        }

        let node_def = node_lookup[node_id.as_str()];

        let outcome: Result<NodeResult, NodeError> = match registry.get(&node_def.node_type) {
            Some(handler) => handler.execute(node_def, &results, &ctx).await,
            None => Err(NodeError::UnknownNodeType(node_def.node_type.clone())),
        };

        match outcome {
            Ok(result) => {
                info!(node_id, status = ?result.status(), "node completed");
                sink.patch_result(node_id, &result).await;
                results.insert(node_id.clone(), result);
            }
            Err(node_error) => {
                let engine_error = EngineError::NodeFailed { node_id: node_id.clone(), source: node_error.clone() };
                let message = engine_error.to_string();
                error!(node_id, error = %node_error, "node failed, execution stopping");

                let failed_result = NodeResult::Failed(FailedResult {
                    node_type: node_def.node_type.clone(),
                    error: node_error.to_string(),
                    target: results.values().find_map(|r| r.target()).map(|s| s.to_string()),
                });
                sink.patch_result(node_id, &failed_result).await;
                results.insert(node_id.clone(), failed_result);

                sink.mark_terminal(ExecutionStatus::Failed, Some(&message)).await;
                return ExecutionOutcome { status: ExecutionStatus::Failed, results, error: Some(message) };
            }
        }
    }

    // Step 7: non-fatal executive report.
    let (key, value) = build_ai_report(&deps.ai, &results).await;
    sink.patch_result(key, &NodeResult::Document(nodes::result::DocumentResult {
        kind: key.to_string(),
        summary: value.get("ai_report").and_then(|v| v.as_str()).map(|s| s.to_string()),
        changes: Some(value),
        monthly_cost: None,
        target: None,
    }))
    .await;

    sink.mark_terminal(ExecutionStatus::Completed, None).await;
    info!(workflow_id = %workflow.id, %execution_id, "execution completed");

    ExecutionOutcome { status: ExecutionStatus::Completed, results, error: None }
}

/// Persist a `pending` record and spawn the background task that carries
/// out the rest, then return the execution id immediately.
pub async fn enqueue(
    pool: db::DbPool,
    registry: Arc<nodes::Registry>,
    deps: Arc<HandlerDeps>,
    workflow: Workflow,
) -> Result<Uuid, EngineError> {
    let row = db::repository::executions::create_pending(&pool, workflow.id).await?;
    let execution_id = row.id;

    tokio::spawn(async move {
        let sink = DbSink::new(pool, execution_id);
        run(&workflow, &registry, deps, execution_id, &sink).await;
    });

    Ok(execution_id)
}

/// Run a workflow fully in-process with no persistence — used by `cli run`
/// for local testing without Postgres.
pub async fn run_in_memory(workflow: &Workflow, registry: &nodes::Registry, ai: AiAdapter) -> ExecutionOutcome {
    let deps = Arc::new(HandlerDeps {
        tools: Arc::new(tools::ShellToolAdapter::new()),
        ai: Arc::new(ai),
        source_control: Arc::new(collaborators::GithubSourceControl::new()),
        notifier: Arc::new(collaborators::HttpNotifier::new()),
        users: Arc::new(collaborators::InMemoryUserStore::from_env()),
    });

    let sink = NullSink::default();
    run(workflow, registry, deps, Uuid::new_v4(), &sink).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Edge;
    use nodes::mock::test_context;
    use serde_json::json;

    fn trigger_workflow(email_config: serde_json::Value) -> Workflow {
        let nodes = vec![
            nodes::NodeDefinition { id: "T".into(), node_type: "trigger".into(), data: json!({"sourceUrl": "https://example.com"}) },
            nodes::NodeDefinition { id: "N".into(), node_type: "nmap".into(), data: json!({}) },
            nodes::NodeDefinition { id: "E".into(), node_type: "email".into(), data: json!({"config": email_config}) },
        ];
        let edges = vec![Edge { from: "T".into(), to: "N".into() }, Edge { from: "N".into(), to: "E".into() }];
        Workflow::new("scenario-a", "owner-1", nodes, edges)
    }

    fn secret_decision_workflow() -> Workflow {
        let nodes = vec![
            nodes::NodeDefinition { id: "T".into(), node_type: "trigger".into(), data: json!({}) },
            nodes::NodeDefinition { id: "S".into(), node_type: "secret-scan".into(), data: json!({}) },
            nodes::NodeDefinition {
                id: "D".into(),
                node_type: "decision".into(),
                data: json!({"variable": "vulnerabilities", "operator": "gt", "threshold": "5"}),
            },
            nodes::NodeDefinition { id: "F".into(), node_type: "auto-fix".into(), data: json!({}) },
        ];
        let edges = vec![
            Edge { from: "T".into(), to: "S".into() },
            Edge { from: "S".into(), to: "D".into() },
            Edge { from: "D".into(), to: "F".into() },
        ];
        Workflow::new("scenario-b", "owner-1", nodes, edges)
    }

    fn test_deps() -> Arc<HandlerDeps> {
        test_context().deps
    }

    #[tokio::test]
    async fn scenario_a_trigger_scan_email_completes() {
        let workflow = trigger_workflow(json!({"email": "a@b.c"}));
        let registry = nodes::registry::build();
        let sink = NullSink::default();

        let outcome = run(&workflow, &registry, test_deps(), Uuid::new_v4(), &sink).await;

        assert_eq!(outcome.status, ExecutionStatus::Completed);
        assert_eq!(outcome.results["T"].target(), Some("https://example.com"));
        match &outcome.results["N"] {
            NodeResult::Scanner(s) => assert_eq!(s.scanner, "nmap"),
            _ => panic!("expected Scanner result"),
        }
        assert!(matches!(outcome.results["E"].status(), nodes::result::NodeStatus::Sent | nodes::result::NodeStatus::Failed));
    }

    #[tokio::test]
    async fn scenario_b_decision_false_skips_auto_fix() {
        let workflow = secret_decision_workflow();
        let registry = nodes::registry::build();
        let sink = NullSink::default();

        let outcome = run(&workflow, &registry, test_deps(), Uuid::new_v4(), &sink).await;

        assert_eq!(outcome.status, ExecutionStatus::Completed);
        assert_eq!(outcome.results["D"].decision_outcome(), Some(false));
        assert!(outcome.results["F"].is_skipped());
    }

    #[tokio::test]
    async fn unknown_node_type_fails_the_execution() {
        let nodes = vec![nodes::NodeDefinition { id: "X".into(), node_type: "not-a-real-type".into(), data: json!({}) }];
        let workflow = Workflow::new("bad", "owner-1", nodes, vec![]);
        let registry = nodes::registry::build();
        let sink = NullSink::default();

        let outcome = run(&workflow, &registry, test_deps(), Uuid::new_v4(), &sink).await;

        assert_eq!(outcome.status, ExecutionStatus::Failed);
        assert!(outcome.results["X"].is_failed());
    }

    #[tokio::test]
    async fn cyclic_workflow_fails_before_any_node_runs() {
        let nodes = vec![
            nodes::NodeDefinition { id: "a".into(), node_type: "trigger".into(), data: json!({}) },
            nodes::NodeDefinition { id: "b".into(), node_type: "nmap".into(), data: json!({}) },
        ];
        let edges = vec![Edge { from: "a".into(), to: "b".into() }, Edge { from: "b".into(), to: "a".into() }];
        let workflow = Workflow::new("cyclic", "owner-1", nodes, edges);
        let registry = nodes::registry::build();
        let sink = NullSink::default();

        let outcome = run(&workflow, &registry, test_deps(), Uuid::new_v4(), &sink).await;

        assert_eq!(outcome.status, ExecutionStatus::Failed);
        assert!(outcome.results.is_empty());
    }
}
