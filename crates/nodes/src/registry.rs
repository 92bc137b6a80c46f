//! Handler Registry — maps each closed-set node-type tag to its
//! [`ExecutableNode`] implementation.

use std::collections::HashMap;
use std::sync::Arc;

use tools::ToolKind;

use crate::handlers::{analysis, auto_fix, decision, notify, scanner, trigger};
use crate::ExecutableNode;

pub type Registry = HashMap<String, Arc<dyn ExecutableNode>>;

/// Build the registry covering every tag in the closed set.
/// Unknown tags are not entries here; the controller maps a missing lookup
/// to [`crate::NodeError::UnknownNodeType`].
pub fn build() -> Registry {
    let mut registry: Registry = HashMap::new();

    registry.insert("trigger".to_string(), Arc::new(trigger::TriggerNode));

    for kind in [
        ToolKind::Nmap,
        ToolKind::Nikto,
        ToolKind::Gobuster,
        ToolKind::Sqlmap,
        ToolKind::Wpscan,
        ToolKind::SecretScan,
        ToolKind::DependencyCheck,
        ToolKind::SemgrepScan,
        ToolKind::ContainerScan,
        ToolKind::KubeBench,
        ToolKind::IacScan,
        ToolKind::OwaspVulnerabilities,
    ] {
        registry.insert(kind.tag().to_string(), Arc::new(scanner::ScannerNode::new(kind)));
    }

    registry.insert("decision".to_string(), Arc::new(decision::DecisionNode));
    registry.insert("email".to_string(), Arc::new(notify::EmailNode));
    registry.insert("slack".to_string(), Arc::new(notify::SlackNode));
    registry.insert("github-issue".to_string(), Arc::new(notify::GithubIssueNode));
    registry.insert("auto-fix".to_string(), Arc::new(auto_fix::AutoFixNode));

    registry.insert("flow-chart".to_string(), Arc::new(analysis::FlowChartNode));
    registry.insert("policy-check".to_string(), Arc::new(analysis::PolicyCheckNode));
    registry.insert("generate-iac".to_string(), Arc::new(analysis::GenerateIacNode));
    registry.insert("estimate-cost".to_string(), Arc::new(analysis::EstimateCostNode));
    registry.insert("drift-check".to_string(), Arc::new(analysis::DriftCheckNode));
    registry.insert("generate-docs".to_string(), Arc::new(analysis::GenerateDocsNode));

    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_every_closed_set_tag() {
        let registry = build();
        let expected = [
            "trigger", "nmap", "nikto", "gobuster", "sqlmap", "wpscan", "owasp-vulnerabilities",
            "secret-scan", "dependency-check", "semgrep-scan", "container-scan", "flow-chart",
            "auto-fix", "email", "github-issue", "slack", "decision", "estimate-cost",
            "policy-check", "generate-iac", "drift-check", "kube-bench", "iac-scan", "generate-docs",
        ];
        for tag in expected {
            assert!(registry.contains_key(tag), "missing handler for '{tag}'");
        }
        assert_eq!(registry.len(), expected.len());
    }
}
