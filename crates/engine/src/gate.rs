//! Skip/Gate Evaluator.
//!
//! A node is skipped if any direct predecessor's result is `skipped` or
//! `failed`, or is a `decision` result with `decision_result = false`.
//! Skips cascade because the same rule applies to every descendant in turn.

use std::collections::HashMap;

use nodes::{NodeResult, ResultStore};

use crate::models::Edge;

/// Precomputed in-edges index: node id -> ids of its direct predecessors,
/// built once per run rather than walked fresh for every node.
pub struct InEdgesIndex<'a>(HashMap<&'a str, Vec<&'a str>>);

impl<'a> InEdgesIndex<'a> {
    pub fn build(edges: &'a [Edge]) -> Self {
        let mut index: HashMap<&str, Vec<&str>> = HashMap::new();
        for edge in edges {
            index.entry(edge.to.as_str()).or_default().push(edge.from.as_str());
        }
        Self(index)
    }

    fn predecessors_of(&self, node_id: &str) -> &[&str] {
        self.0.get(node_id).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Returns `Some(reason)` if `node_id` should be skipped given `results` so
/// far, or `None` if it should execute.
pub fn should_skip(node_id: &str, index: &InEdgesIndex, results: &ResultStore) -> Option<String> {
    for &predecessor_id in index.predecessors_of(node_id) {
        let Some(predecessor_result) = results.get(predecessor_id) else { continue };

        match predecessor_result {
            NodeResult::Skipped(_) => {
                return Some(format!("predecessor '{predecessor_id}' was skipped"));
            }
            NodeResult::Failed(_) => {
                return Some(format!("predecessor '{predecessor_id}' failed"));
            }
            NodeResult::Decision(d) if !d.decision_result => {
                return Some(format!("predecessor '{predecessor_id}' (decision) evaluated to false"));
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use nodes::result::{DecisionResult, SkippedResult, TriggerResult};

    fn edges() -> Vec<Edge> {
        vec![
            Edge { from: "t".into(), to: "d".into() },
            Edge { from: "d".into(), to: "f".into() },
        ]
    }

    #[test]
    fn no_predecessors_never_skips() {
        let index = InEdgesIndex::build(&[]);
        let results: ResultStore = IndexMap::new();
        assert_eq!(should_skip("t", &index, &results), None);
    }

    #[test]
    fn decision_result_false_skips_dependent() {
        let edges = edges();
        let index = InEdgesIndex::build(&edges);
        let mut results: ResultStore = IndexMap::new();
        results.insert("t".into(), NodeResult::Trigger(TriggerResult { target: "x".into() }));
        results.insert(
            "d".into(),
            NodeResult::Decision(DecisionResult {
                variable: "vulnerabilities".into(),
                operator: "gt".into(),
                threshold: 5.0,
                actual_value: 1.0,
                decision_result: false,
            }),
        );

        assert!(should_skip("f", &index, &results).is_some());
    }

    #[test]
    fn skip_cascades_through_a_skipped_predecessor() {
        let edges = edges();
        let index = InEdgesIndex::build(&edges);
        let mut results: ResultStore = IndexMap::new();
        results.insert("t".into(), NodeResult::Trigger(TriggerResult { target: "x".into() }));
        results.insert("d".into(), NodeResult::Skipped(SkippedResult { reason: "upstream gate".into() }));

        assert!(should_skip("f", &index, &results).is_some());
    }
}
