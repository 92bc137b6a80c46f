//! `trigger` handler.

use async_trait::async_trait;

use crate::result::{NodeResult, TriggerResult};
use crate::traits::{ExecutionContext, NodeDefinition, ResultStore};
use crate::{ExecutableNode, NodeError};

pub struct TriggerNode;

#[async_trait]
impl ExecutableNode for TriggerNode {
    async fn execute(
        &self,
        node: &NodeDefinition,
        _prior_results: &ResultStore,
        _ctx: &ExecutionContext,
    ) -> Result<NodeResult, NodeError> {
        let source_url = node.data.get("sourceUrl").and_then(|v| v.as_str());

        let target = match source_url {
            Some("") => {
                return Err(NodeError::Configuration(
                    "trigger node's sourceUrl is present but empty".to_string(),
                ))
            }
            Some(url) => url.to_string(),
            None => "example.com".to_string(),
        };

        Ok(NodeResult::Trigger(TriggerResult { target }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use serde_json::json;

    fn ctx() -> ExecutionContext {
        crate::mock::test_context()
    }

    #[tokio::test]
    async fn missing_source_url_defaults_to_example_com() {
        let node = NodeDefinition {
            id: "t".into(),
            node_type: "trigger".into(),
            data: json!({}),
        };
        let result = TriggerNode.execute(&node, &IndexMap::new(), &ctx()).await.unwrap();
        assert_eq!(result.target(), Some("example.com"));
    }

    #[tokio::test]
    async fn empty_source_url_is_a_configuration_error() {
        let node = NodeDefinition {
            id: "t".into(),
            node_type: "trigger".into(),
            data: json!({"sourceUrl": ""}),
        };
        let result = TriggerNode.execute(&node, &IndexMap::new(), &ctx()).await;
        assert!(matches!(result, Err(NodeError::Configuration(_))));
    }

    #[tokio::test]
    async fn present_source_url_is_used_verbatim() {
        let node = NodeDefinition {
            id: "t".into(),
            node_type: "trigger".into(),
            data: json!({"sourceUrl": "https://example.org"}),
        };
        let result = TriggerNode.execute(&node, &IndexMap::new(), &ctx()).await.unwrap();
        assert_eq!(result.target(), Some("https://example.org"));
    }
}
