//! The remaining document-producing node types: `flow-chart`,
//! `policy-check`, `generate-iac`, `estimate-cost`, `drift-check`,
//! `generate-docs`. Each always completes; some embed structured `changes`
//! for downstream `decision` nodes to read.

use async_trait::async_trait;
use serde_json::json;

use crate::result::{DocumentResult, NodeResult};
use crate::traits::{ExecutionContext, NodeDefinition, ResultStore};
use crate::{ExecutableNode, NodeError};

fn target_of(prior_results: &ResultStore) -> Option<String> {
    prior_results.values().find_map(|r| r.target()).map(|s| s.to_string())
}

fn aggregate_findings(prior_results: &ResultStore) -> String {
    let mut report = String::new();
    for (id, result) in prior_results {
        if let NodeResult::Scanner(s) = result {
            report.push_str(&format!("Node {id} ({}) Output:\n{}\n\n", s.scanner, s.output));
        }
    }
    report
}

pub struct FlowChartNode;

#[async_trait]
impl ExecutableNode for FlowChartNode {
    async fn execute(
        &self,
        _node: &NodeDefinition,
        prior_results: &ResultStore,
        _ctx: &ExecutionContext,
    ) -> Result<NodeResult, NodeError> {
        let steps: Vec<&str> = prior_results.keys().map(|k| k.as_str()).collect();
        Ok(NodeResult::Document(DocumentResult {
            kind: "flow-chart".to_string(),
            summary: Some(format!("{} steps executed so far", steps.len())),
            changes: Some(json!({"steps": steps})),
            monthly_cost: None,
            target: target_of(prior_results),
        }))
    }
}

pub struct PolicyCheckNode;

#[async_trait]
impl ExecutableNode for PolicyCheckNode {
    async fn execute(
        &self,
        node: &NodeDefinition,
        prior_results: &ResultStore,
        _ctx: &ExecutionContext,
    ) -> Result<NodeResult, NodeError> {
        let policy = node.data.get("policy").and_then(|v| v.as_str()).unwrap_or("default");
        let violations: Vec<&str> = prior_results
            .values()
            .filter_map(|r| match r {
                NodeResult::Scanner(s) if s.data.get("vulnerabilitiesFound").and_then(|v| v.as_f64()).unwrap_or(0.0) > 0.0 => {
                    Some(s.scanner.as_str())
                }
                _ => None,
            })
            .collect();

        Ok(NodeResult::Document(DocumentResult {
            kind: "policy-check".to_string(),
            summary: Some(format!("policy '{policy}' evaluated against {} scanner(s)", violations.len())),
            changes: Some(json!({"policy": policy, "violatingScanners": violations})),
            monthly_cost: None,
            target: target_of(prior_results),
        }))
    }
}

pub struct GenerateIacNode;

#[async_trait]
impl ExecutableNode for GenerateIacNode {
    async fn execute(
        &self,
        node: &NodeDefinition,
        prior_results: &ResultStore,
        ctx: &ExecutionContext,
    ) -> Result<NodeResult, NodeError> {
        let target = target_of(prior_results).unwrap_or_default();
        let context = aggregate_findings(prior_results);
        let description = node
            .data
            .get("description")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("harden the infrastructure serving {target}"));

        let iac = ctx.deps.ai.generate_workflow_json(&format!("{description}\n\ncontext:\n{context}")).await.ok();

        Ok(NodeResult::Document(DocumentResult {
            kind: "generate-iac".to_string(),
            summary: Some(description),
            changes: iac.map(|body| json!({"iac": body})),
            monthly_cost: None,
            target: Some(target),
        }))
    }
}

pub struct EstimateCostNode;

#[async_trait]
impl ExecutableNode for EstimateCostNode {
    async fn execute(
        &self,
        node: &NodeDefinition,
        prior_results: &ResultStore,
        _ctx: &ExecutionContext,
    ) -> Result<NodeResult, NodeError> {
        let base_rate = node.data.get("baseRate").and_then(|v| v.as_f64()).unwrap_or(50.0);
        let per_finding = node.data.get("perFindingRate").and_then(|v| v.as_f64()).unwrap_or(12.5);

        let finding_count: f64 = prior_results
            .values()
            .filter_map(|r| match r {
                NodeResult::Scanner(s) => Some(
                    s.data.get("vulnerabilitiesFound").and_then(|v| v.as_f64()).unwrap_or(0.0)
                        + s.data.get("leakedSecrets").and_then(|v| v.as_f64()).unwrap_or(0.0),
                ),
                _ => None,
            })
            .sum();

        let monthly_cost = base_rate + per_finding * finding_count;

        Ok(NodeResult::Document(DocumentResult {
            kind: "estimate-cost".to_string(),
            summary: Some(format!("estimated monthly remediation cost: ${monthly_cost:.2}")),
            changes: None,
            monthly_cost: Some(monthly_cost),
            target: target_of(prior_results),
        }))
    }
}

pub struct DriftCheckNode;

#[async_trait]
impl ExecutableNode for DriftCheckNode {
    async fn execute(
        &self,
        node: &NodeDefinition,
        prior_results: &ResultStore,
        _ctx: &ExecutionContext,
    ) -> Result<NodeResult, NodeError> {
        let baseline = node.data.get("baseline").and_then(|v| v.as_str());
        let drifted = baseline.is_some_and(|b| {
            prior_results.values().any(|r| matches!(r, NodeResult::Scanner(s) if s.output != b))
        });

        Ok(NodeResult::Document(DocumentResult {
            kind: "drift-check".to_string(),
            summary: Some(if drifted { "drift detected" } else { "no drift detected" }.to_string()),
            changes: Some(json!({"drifted": drifted})),
            monthly_cost: None,
            target: target_of(prior_results),
        }))
    }
}

pub struct GenerateDocsNode;

#[async_trait]
impl ExecutableNode for GenerateDocsNode {
    async fn execute(
        &self,
        _node: &NodeDefinition,
        prior_results: &ResultStore,
        ctx: &ExecutionContext,
    ) -> Result<NodeResult, NodeError> {
        let target = target_of(prior_results).unwrap_or_default();
        let context = aggregate_findings(prior_results);
        let docs = ctx.deps.ai.generate_documentation(&target, &context).await.ok();

        Ok(NodeResult::Document(DocumentResult {
            kind: "generate-docs".to_string(),
            summary: docs.clone(),
            changes: docs.map(|body| json!({"documentation": body})),
            monthly_cost: None,
            target: Some(target),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use serde_json::json as j;

    fn empty_node(node_type: &str) -> NodeDefinition {
        NodeDefinition { id: "a".into(), node_type: node_type.into(), data: j!({}) }
    }

    #[tokio::test]
    async fn flow_chart_reports_step_count() {
        let mut prior: ResultStore = IndexMap::new();
        prior.insert(
            "T".into(),
            NodeResult::Trigger(crate::result::TriggerResult { target: "example.com".into() }),
        );
        let result = FlowChartNode.execute(&empty_node("flow-chart"), &prior, &crate::mock::test_context()).await.unwrap();
        match result {
            NodeResult::Document(d) => assert_eq!(d.changes.unwrap()["steps"].as_array().unwrap().len(), 1),
            _ => panic!("expected Document result"),
        }
    }

    #[tokio::test]
    async fn estimate_cost_scales_with_findings() {
        let mut prior: ResultStore = IndexMap::new();
        prior.insert(
            "S".into(),
            NodeResult::Scanner(crate::result::ScannerResult {
                scanner: "nmap".into(),
                target: "example.com".into(),
                output: String::new(),
                data: j!({"vulnerabilitiesFound": 3.0, "leakedSecrets": 0.0}),
            }),
        );
        let result = EstimateCostNode.execute(&empty_node("estimate-cost"), &prior, &crate::mock::test_context()).await.unwrap();
        match result {
            NodeResult::Document(d) => assert_eq!(d.monthly_cost, Some(50.0 + 12.5 * 3.0)),
            _ => panic!("expected Document result"),
        }
    }

    #[tokio::test]
    async fn drift_check_without_baseline_reports_no_drift() {
        let result = DriftCheckNode
            .execute(&empty_node("drift-check"), &IndexMap::new(), &crate::mock::test_context())
            .await
            .unwrap();
        match result {
            NodeResult::Document(d) => assert_eq!(d.summary, Some("no drift detected".to_string())),
            _ => panic!("expected Document result"),
        }
    }
}
