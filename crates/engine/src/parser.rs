//! DAG Parser — deserializes a stored workflow definition
//! and validates its shape. No semantic checks here: cycle detection lives
//! in [`crate::dag`], skip/gate semantics in [`crate::gate`].

use serde_json::Value;
use uuid::Uuid;

use crate::models::{Edge, Workflow};
use crate::EngineError;
use nodes::NodeDefinition;

/// Parse a workflow from its stored JSON `definition` column.
///
/// Expects `{"id", "name", "owner", "nodes": [...], "edges": [...]}`. Fails
/// with [`EngineError::MalformedWorkflow`] if `nodes` is empty, a node lacks
/// `id`/`type`, an edge references an unknown node, or the shape is
/// otherwise invalid.
pub fn parse(raw: &Value) -> Result<Workflow, EngineError> {
    let obj = raw.as_object().ok_or_else(|| EngineError::MalformedWorkflow("definition is not a JSON object".to_string()))?;

    let id = obj
        .get("id")
        .and_then(|v| v.as_str())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    let name = obj.get("name").and_then(|v| v.as_str()).unwrap_or("unnamed").to_string();
    let owner = obj
        .get("owner")
        .and_then(|v| v.as_str())
        .ok_or_else(|| EngineError::MalformedWorkflow("missing 'owner'".to_string()))?
        .to_string();

    let raw_nodes = obj
        .get("nodes")
        .and_then(|v| v.as_array())
        .ok_or_else(|| EngineError::MalformedWorkflow("missing 'nodes' array".to_string()))?;

    if raw_nodes.is_empty() {
        return Err(EngineError::MalformedWorkflow("'nodes' array must not be empty".to_string()));
    }

    let mut nodes = Vec::with_capacity(raw_nodes.len());
    for raw_node in raw_nodes {
        let node_id = raw_node
            .get("id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| EngineError::MalformedWorkflow("node missing 'id'".to_string()))?
            .to_string();
        let node_type = raw_node
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or_else(|| EngineError::MalformedWorkflow(format!("node '{node_id}' missing 'type'")))?
            .to_string();
        let data = raw_node.get("data").cloned().unwrap_or(Value::Object(Default::default()));

        nodes.push(NodeDefinition { id: node_id, node_type, data });
    }

    let known_ids: std::collections::HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();

    let raw_edges = obj.get("edges").and_then(|v| v.as_array()).cloned().unwrap_or_default();
    let mut edges = Vec::with_capacity(raw_edges.len());
    for raw_edge in &raw_edges {
        let from = raw_edge
            .get("from")
            .and_then(|v| v.as_str())
            .ok_or_else(|| EngineError::MalformedWorkflow("edge missing 'from'".to_string()))?
            .to_string();
        let to = raw_edge
            .get("to")
            .and_then(|v| v.as_str())
            .ok_or_else(|| EngineError::MalformedWorkflow("edge missing 'to'".to_string()))?
            .to_string();

        if !known_ids.contains(from.as_str()) {
            return Err(EngineError::MalformedWorkflow(format!("edge references unknown node '{from}'")));
        }
        if !known_ids.contains(to.as_str()) {
            return Err(EngineError::MalformedWorkflow(format!("edge references unknown node '{to}'")));
        }

        edges.push(Edge { from, to });
    }

    Ok(Workflow { id, name, owner, nodes, edges, created_at: chrono::Utc::now() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_a_well_formed_definition() {
        let raw = json!({
            "owner": "owner-1",
            "nodes": [
                {"id": "t", "type": "trigger", "data": {}},
                {"id": "n", "type": "nmap", "data": {}},
            ],
            "edges": [{"from": "t", "to": "n"}],
        });

        let workflow = parse(&raw).unwrap();
        assert_eq!(workflow.nodes.len(), 2);
        assert_eq!(workflow.edges.len(), 1);
    }

    #[test]
    fn empty_nodes_array_is_malformed() {
        let raw = json!({"owner": "owner-1", "nodes": [], "edges": []});
        assert!(matches!(parse(&raw), Err(EngineError::MalformedWorkflow(_))));
    }

    #[test]
    fn node_missing_type_is_malformed() {
        let raw = json!({"owner": "owner-1", "nodes": [{"id": "t"}], "edges": []});
        assert!(matches!(parse(&raw), Err(EngineError::MalformedWorkflow(_))));
    }

    #[test]
    fn edge_referencing_unknown_node_is_malformed() {
        let raw = json!({
            "owner": "owner-1",
            "nodes": [{"id": "t", "type": "trigger", "data": {}}],
            "edges": [{"from": "t", "to": "ghost"}],
        });
        assert!(matches!(parse(&raw), Err(EngineError::MalformedWorkflow(_))));
    }
}
