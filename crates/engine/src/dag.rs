//! Topological Scheduler — produces a linear execution order using Kahn's
//! algorithm, with a stable tie-break among zero-in-degree nodes: insertion
//! order of `workflow.nodes`, not hash-map iteration order. This is
//! observable and must stay stable so repeated executions of the same
//! definition visit nodes in identical order.

use std::collections::{HashMap, HashSet};

use crate::models::Workflow;
use crate::EngineError;

/// Compute a topological ordering of `workflow`'s nodes.
///
/// # Errors
/// [`EngineError::CyclicWorkflow`] if the in-degree walk doesn't visit every
/// node.
pub fn topological_order(workflow: &Workflow) -> Result<Vec<String>, EngineError> {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut in_degree: HashMap<&str, usize> = HashMap::new();

    for node in &workflow.nodes {
        adjacency.entry(node.id.as_str()).or_default();
        in_degree.entry(node.id.as_str()).or_insert(0);
    }

    for edge in &workflow.edges {
        adjacency.entry(edge.from.as_str()).or_default().push(edge.to.as_str());
        *in_degree.entry(edge.to.as_str()).or_insert(0) += 1;
    }

    // Seed the frontier from `workflow.nodes` in declared order, not
    // `in_degree`'s hash iteration order — this is what makes repeated runs
    // of the same definition produce the same order among nodes that start
    // at zero in-degree simultaneously.
    let mut frontier: Vec<&str> = workflow
        .nodes
        .iter()
        .map(|n| n.id.as_str())
        .filter(|id| in_degree[id] == 0)
        .collect();

    let mut sorted: Vec<String> = Vec::with_capacity(workflow.nodes.len());
    let mut visited: HashSet<&str> = HashSet::new();

    while !frontier.is_empty() {
        let mut next_frontier: Vec<&str> = Vec::new();

        for node_id in frontier.drain(..) {
            if !visited.insert(node_id) {
                continue;
            }
            sorted.push(node_id.to_string());

            if let Some(neighbours) = adjacency.get(node_id) {
                for &neighbour in neighbours {
                    let deg = in_degree.get_mut(neighbour).expect("neighbour must have an in-degree entry");
                    *deg -= 1;
                    if *deg == 0 {
                        next_frontier.push(neighbour);
                    }
                }
            }
        }

        // Preserve declared order among nodes that became ready in the same
        // round, for the same reason the initial seed does.
        next_frontier.sort_by_key(|id| workflow.nodes.iter().position(|n| n.id == *id).unwrap_or(usize::MAX));
        frontier = next_frontier;
    }

    if sorted.len() != workflow.nodes.len() {
        return Err(EngineError::CyclicWorkflow);
    }

    Ok(sorted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Edge;
    use nodes::NodeDefinition;
    use serde_json::json;

    fn node(id: &str) -> NodeDefinition {
        NodeDefinition { id: id.to_string(), node_type: "mock".into(), data: json!({}) }
    }

    fn workflow(nodes: Vec<NodeDefinition>, edges: Vec<Edge>) -> Workflow {
        Workflow::new("test", "owner-1", nodes, edges)
    }

    #[test]
    fn linear_chain_sorts_in_declared_order() {
        let wf = workflow(
            vec![node("a"), node("b"), node("c")],
            vec![Edge { from: "a".into(), to: "b".into() }, Edge { from: "b".into(), to: "c".into() }],
        );
        assert_eq!(topological_order(&wf).unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn disconnected_roots_preserve_declaration_order() {
        // b and c both have in-degree 0; declared order is a, b, c, so the
        // frontier visits b before c even though neither depends on the
        // other. Hash-map seeding would not guarantee this.
        let wf = workflow(vec![node("b"), node("c"), node("a")], vec![]);
        assert_eq!(topological_order(&wf).unwrap(), vec!["b", "c", "a"]);
    }

    #[test]
    fn cycle_is_rejected() {
        let wf = workflow(
            vec![node("a"), node("b")],
            vec![Edge { from: "a".into(), to: "b".into() }, Edge { from: "b".into(), to: "a".into() }],
        );
        assert!(matches!(topological_order(&wf), Err(EngineError::CyclicWorkflow)));
    }

    #[test]
    fn diamond_keeps_source_first_and_sink_last() {
        let wf = workflow(
            vec![node("a"), node("b"), node("c"), node("d")],
            vec![
                Edge { from: "a".into(), to: "b".into() },
                Edge { from: "a".into(), to: "c".into() },
                Edge { from: "b".into(), to: "d".into() },
                Edge { from: "c".into(), to: "d".into() },
            ],
        );
        let sorted = topological_order(&wf).unwrap();
        assert_eq!(sorted.first().unwrap(), "a");
        assert_eq!(sorted.last().unwrap(), "d");
        assert_eq!(sorted.len(), 4);
    }
}
