//! `decision` handler — evaluates a rule of shape
//! `(variable, operator, threshold)` against accumulated prior results.

use async_trait::async_trait;
use tracing::warn;

use crate::result::{DecisionResult, NodeResult};
use crate::traits::{ExecutionContext, NodeDefinition, ResultStore};
use crate::{ExecutableNode, NodeError};

pub struct DecisionNode;

/// Accumulate the numeric value a `variable` names by walking prior results.
fn actual_value(variable: &str, prior_results: &ResultStore) -> f64 {
    match variable {
        "vulnerabilities" => Some(
            prior_results
                .values()
                .filter_map(|r| match r {
                    NodeResult::Scanner(s) => Some(
                        s.data.get("vulnerabilitiesFound").and_then(|v| v.as_f64()).unwrap_or(0.0)
                            + s.data.get("leakedSecrets").and_then(|v| v.as_f64()).unwrap_or(0.0),
                    ),
                    _ => None,
                })
                .sum::<f64>(),
        ),
        "cost" => prior_results.values().find_map(|r| match r {
            NodeResult::Document(d) => d.monthly_cost,
            _ => None,
        }),
        "risk_score" => Some(
            prior_results
                .values()
                .filter_map(|r| match r {
                    NodeResult::Scanner(s) => {
                        Some(s.data.get("severityHigh").and_then(|v| v.as_f64()).unwrap_or(0.0) * 5.0)
                    }
                    _ => None,
                })
                .sum::<f64>(),
        ),
        _ => None,
    }
    .unwrap_or_else(|| {
        if variable != "manual_input" {
            warn!(variable, "decision rule found no matching prior value, defaulting actualValue to 0");
        }
        0.0
    })
}

/// Strip currency symbols and thousands separators from a `cost` threshold
/// or prior value before comparing numerically.
fn parse_numeric(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    cleaned.parse().unwrap_or(0.0)
}

fn compare(operator: &str, actual: f64, threshold: f64) -> bool {
    match operator {
        "gt" => actual > threshold,
        "lt" => actual < threshold,
        "eq" => (actual - threshold).abs() < f64::EPSILON,
        "neq" => (actual - threshold).abs() >= f64::EPSILON,
        _ => true,
    }
}

#[async_trait]
impl ExecutableNode for DecisionNode {
    async fn execute(
        &self,
        node: &NodeDefinition,
        prior_results: &ResultStore,
        _ctx: &ExecutionContext,
    ) -> Result<NodeResult, NodeError> {
        let variable = node
            .data
            .get("variable")
            .and_then(|v| v.as_str())
            .unwrap_or("manual_input")
            .to_string();
        let operator = node.data.get("operator").and_then(|v| v.as_str()).unwrap_or("gt").to_string();
        let threshold_raw = node.data.get("threshold").and_then(|v| v.as_str()).unwrap_or("0");
        let threshold = parse_numeric(threshold_raw);

        if variable == "manual_input" {
            return Ok(NodeResult::Decision(DecisionResult {
                variable,
                operator,
                threshold,
                actual_value: 0.0,
                decision_result: true,
            }));
        }

        let actual = if variable == "cost" {
            prior_results
                .values()
                .find_map(|r| match r {
                    NodeResult::Document(d) => d.monthly_cost,
                    _ => None,
                })
                .unwrap_or_else(|| {
                    warn!(variable = "cost", "decision rule found no matching prior value, defaulting actualValue to 0");
                    0.0
                })
        } else {
            actual_value(&variable, prior_results)
        };

        let decision_result = compare(&operator, actual, threshold);

        Ok(NodeResult::Decision(DecisionResult {
            variable,
            operator,
            threshold,
            actual_value: actual,
            decision_result,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use serde_json::json;

    fn node(variable: &str, operator: &str, threshold: &str) -> NodeDefinition {
        NodeDefinition {
            id: "d".into(),
            node_type: "decision".into(),
            data: json!({"variable": variable, "operator": operator, "threshold": threshold}),
        }
    }

    fn scanner_with(leaked_secrets: f64) -> NodeResult {
        NodeResult::Scanner(crate::result::ScannerResult {
            scanner: "secret-scan".into(),
            target: "example.com".into(),
            output: String::new(),
            data: json!({"leakedSecrets": leaked_secrets, "vulnerabilitiesFound": 0.0}),
        })
    }

    #[tokio::test]
    async fn scenario_b_one_leaked_secret_against_gt_five_is_false() {
        let mut prior: ResultStore = IndexMap::new();
        prior.insert("S".into(), scanner_with(1.0));

        let result = DecisionNode
            .execute(&node("vulnerabilities", "gt", "5"), &prior, &crate::mock::test_context())
            .await
            .unwrap();

        assert_eq!(result.decision_outcome(), Some(false));
    }

    #[tokio::test]
    async fn manual_input_always_passes() {
        let result = DecisionNode
            .execute(&node("manual_input", "gt", "0"), &IndexMap::new(), &crate::mock::test_context())
            .await
            .unwrap();
        assert_eq!(result.decision_outcome(), Some(true));
    }

    #[tokio::test]
    async fn missing_value_defaults_to_zero() {
        let result = DecisionNode
            .execute(&node("risk_score", "gt", "0"), &IndexMap::new(), &crate::mock::test_context())
            .await
            .unwrap();
        match result {
            NodeResult::Decision(d) => assert_eq!(d.actual_value, 0.0),
            _ => panic!("expected Decision result"),
        }
    }

    #[test]
    fn parses_currency_formatted_threshold() {
        assert_eq!(parse_numeric("$1,234.50"), 1234.50);
    }
}
