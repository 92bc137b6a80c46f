//! Scanner-family handlers: one [`ScannerNode`] per `ToolKind`, wired
//! through the shared [`tools::ToolAdapter`].

use async_trait::async_trait;
use tools::ToolKind;

use crate::result::{NodeResult, ScannerResult};
use crate::traits::{ExecutionContext, NodeDefinition, ResultStore};
use crate::{ExecutableNode, NodeError};

/// Runs a single scanner tool against the first target carried by any prior
/// result, in topological order.
pub struct ScannerNode {
    pub kind: ToolKind,
}

impl ScannerNode {
    pub fn new(kind: ToolKind) -> Self {
        Self { kind }
    }
}

#[async_trait]
impl ExecutableNode for ScannerNode {
    async fn execute(
        &self,
        _node: &NodeDefinition,
        prior_results: &ResultStore,
        ctx: &ExecutionContext,
    ) -> Result<NodeResult, NodeError> {
        let target = prior_results
            .values()
            .find_map(|r| r.target())
            .ok_or(NodeError::NoTarget)?
            .to_string();

        let output = ctx
            .deps
            .tools
            .run(self.kind, &target)
            .await
            .map_err(|e| NodeError::ToolInvocationFailed(e.to_string()))?;

        Ok(NodeResult::Scanner(ScannerResult {
            scanner: self.kind.tag().to_string(),
            target,
            output: output.text,
            data: serde_json::json!({
                "mocked": output.mocked,
                "vulnerabilitiesFound": output.findings.vulnerabilities_found,
                "leakedSecrets": output.findings.leaked_secrets,
                "severityHigh": output.findings.severity_high,
            }),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use serde_json::json;

    fn node() -> NodeDefinition {
        NodeDefinition { id: "s".into(), node_type: "nmap".into(), data: json!({}) }
    }

    #[tokio::test]
    async fn no_target_available_is_an_error() {
        let scanner = ScannerNode::new(ToolKind::Nmap);
        let result = scanner.execute(&node(), &IndexMap::new(), &crate::mock::test_context()).await;
        assert!(matches!(result, Err(NodeError::NoTarget)));
    }

    #[tokio::test]
    async fn uses_first_target_from_prior_results_in_topological_order() {
        let mut prior: ResultStore = IndexMap::new();
        prior.insert(
            "trigger".into(),
            NodeResult::Trigger(crate::result::TriggerResult { target: "example.com".into() }),
        );
        prior.insert(
            "earlier-scan".into(),
            NodeResult::Scanner(crate::result::ScannerResult {
                scanner: "nmap".into(),
                target: "override.example".into(),
                output: String::new(),
                data: json!({}),
            }),
        );

        let scanner = ScannerNode::new(ToolKind::Nmap);
        let result = scanner.execute(&node(), &prior, &crate::mock::test_context()).await.unwrap();
        match result {
            NodeResult::Scanner(s) => assert_eq!(s.target, "example.com"),
            _ => panic!("expected Scanner result"),
        }
    }
}
