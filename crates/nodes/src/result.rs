//! The tagged `NodeResult` variant — one case per result shape (trigger,
//! scanner, decision, notification, auto-fix, document, skipped, failed)
//! instead of a single struct carrying a dozen optional fields, one set
//! per node family, that callers would otherwise have to type-assert their
//! way through.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The unified status space every node result reports into:
/// `completed`, `skipped`, `failed`, `sent`, or `created`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    Completed,
    Skipped,
    Failed,
    Sent,
    Created,
}

/// Outcome of a terminal publishing node (`email`, `slack`, `github-issue`).
/// These are the only statuses allowed to represent a *soft* failure: the
/// node's own result is `Failed` while the execution still reaches
/// `completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalStatus {
    Sent,
    Created,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerResult {
    pub target: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerResult {
    pub scanner: String,
    pub target: String,
    pub output: String,
    pub data: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionResult {
    pub variable: String,
    pub operator: String,
    pub threshold: f64,
    pub actual_value: f64,
    pub decision_result: bool,
}

/// Covers `email`, `slack`, and `github-issue` — all three are terminal
/// publishing nodes with identical soft-failure semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResult {
    pub channel: String,
    pub recipient: String,
    pub target: Option<String>,
    pub status: TerminalStatus,
    pub error: Option<String>,
    pub issue_number: Option<u64>,
    pub issue_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoFixResult {
    pub pr_url: String,
    pub pr_number: u64,
    pub branch: String,
}

/// Covers `flow-chart`, `policy-check`, `generate-iac`, `estimate-cost`,
/// `drift-check`, `generate-docs` — each always completes and some embed a
/// structured `changes` array for downstream consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResult {
    pub kind: String,
    pub summary: Option<String>,
    pub changes: Option<Value>,
    pub monthly_cost: Option<f64>,
    pub target: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedResult {
    pub reason: String,
}

/// Synthesized by the controller (not by a handler) when a handler returns
/// a hard [`crate::NodeError`] — the one node result that fails the whole
/// execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedResult {
    pub node_type: String,
    pub error: String,
    pub target: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeResult {
    Trigger(TriggerResult),
    Scanner(ScannerResult),
    Decision(DecisionResult),
    Notification(NotificationResult),
    AutoFix(AutoFixResult),
    Document(DocumentResult),
    Skipped(SkippedResult),
    Failed(FailedResult),
}

impl NodeResult {
    /// The unified status value.
    pub fn status(&self) -> NodeStatus {
        match self {
            NodeResult::Trigger(_) => NodeStatus::Completed,
            NodeResult::Scanner(_) => NodeStatus::Completed,
            NodeResult::Decision(_) => NodeStatus::Completed,
            NodeResult::Notification(n) => match n.status {
                TerminalStatus::Sent => NodeStatus::Sent,
                TerminalStatus::Created => NodeStatus::Created,
                TerminalStatus::Failed => NodeStatus::Failed,
            },
            NodeResult::AutoFix(_) => NodeStatus::Created,
            NodeResult::Document(_) => NodeStatus::Completed,
            NodeResult::Skipped(_) => NodeStatus::Skipped,
            NodeResult::Failed(_) => NodeStatus::Failed,
        }
    }

    /// The `target` this node's result carries, if any — scanner and
    /// auto-fix nodes read this off the nearest prior result that has one.
    pub fn target(&self) -> Option<&str> {
        match self {
            NodeResult::Trigger(t) => Some(t.target.as_str()),
            NodeResult::Scanner(s) => Some(s.target.as_str()),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status(), NodeStatus::Failed)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, NodeResult::Skipped(_))
    }

    /// The boolean a `decision` node produced, if this is a decision result.
    pub fn decision_outcome(&self) -> Option<bool> {
        match self {
            NodeResult::Decision(d) => Some(d.decision_result),
            _ => None,
        }
    }
}
