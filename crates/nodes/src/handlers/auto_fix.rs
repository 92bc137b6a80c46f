//! `auto-fix` handler — a multi-step protocol over the source-control and
//! AI collaborators: infer the vulnerable path, describe it, generate a
//! fix, open a branch and commit, then raise a pull request.

use async_trait::async_trait;

use crate::handlers::notify::resolve_owner_repo;
use crate::result::{AutoFixResult, NodeResult};
use crate::traits::{ExecutionContext, NodeDefinition, ResultStore};
use crate::{ExecutableNode, NodeError};

pub struct AutoFixNode;

/// Scan prior scanner output for `"file": "<p>"` or `"path": "<p>"` and
/// adopt the first match.
fn infer_path(prior_results: &ResultStore) -> Option<String> {
    for result in prior_results.values() {
        if let NodeResult::Scanner(s) = result {
            if let Some(path) = extract_quoted_field(&s.output, "file")
                .or_else(|| extract_quoted_field(&s.output, "path"))
            {
                return Some(path);
            }
        }
    }
    None
}

fn extract_quoted_field(text: &str, field: &str) -> Option<String> {
    let needle = format!("\"{field}\": \"");
    let start = text.find(&needle)? + needle.len();
    let rest = &text[start..];
    let end = rest.find('"')?;
    Some(rest[..end].to_string())
}

fn target_of(prior_results: &ResultStore) -> Option<String> {
    prior_results.values().find_map(|r| r.target()).map(|s| s.to_string())
}

fn aggregate_context(prior_results: &ResultStore) -> String {
    let mut context = String::new();
    for (id, result) in prior_results {
        if let NodeResult::Scanner(s) = result {
            context.push_str(&format!("Node {id} ({}) Output:\n{}\n\n", s.scanner, s.output));
        }
    }
    context
}

#[async_trait]
impl ExecutableNode for AutoFixNode {
    async fn execute(
        &self,
        node: &NodeDefinition,
        prior_results: &ResultStore,
        ctx: &ExecutionContext,
    ) -> Result<NodeResult, NodeError> {
        // Step 1: owner/repo/branch.
        let target = target_of(prior_results);
        let (owner, repo) = resolve_owner_repo(node, target.as_deref())?;
        let base_branch = node
            .data
            .get("config")
            .and_then(|c| c.get("branch"))
            .and_then(|v| v.as_str())
            .unwrap_or("main")
            .to_string();

        let user = ctx.deps.users.get_user(&ctx.owner).await.map_err(|_| NodeError::MissingCredential)?;
        let token = user.access_token.ok_or(NodeError::MissingCredential)?;

        // Step 2: path.
        let path = match node.data.get("config").and_then(|c| c.get("path")).and_then(|v| v.as_str()) {
            Some(p) => p.to_string(),
            None => infer_path(prior_results).ok_or(NodeError::NoPathInferable)?,
        };

        // Step 3: fetch content.
        let content = ctx
            .deps
            .source_control
            .get_file_content(&token, &owner, &repo, &path)
            .await
            .map_err(|e| NodeError::ToolInvocationFailed(e.to_string()))?;

        // Step 4: vulnerability description.
        let scan_context = aggregate_context(prior_results);
        let vulnerability = match node.data.get("config").and_then(|c| c.get("vulnerability")).and_then(|v| v.as_str()) {
            Some(v) => v.to_string(),
            None => ctx
                .deps
                .ai
                .analyze_code(&path, &content, &scan_context)
                .await
                .map_err(|_| NodeError::NoProviderConfigured)?,
        };

        // Step 5: generate fix.
        let fixed_content = ctx
            .deps
            .ai
            .generate_fix(&content, &vulnerability)
            .await
            .map_err(|_| NodeError::NoProviderConfigured)?;

        // Step 6: create branch off base HEAD.
        let base_ref = ctx
            .deps
            .source_control
            .get_reference(&token, &owner, &repo, &base_branch)
            .await
            .map_err(|e| NodeError::ToolInvocationFailed(e.to_string()))?;

        let branch = format!("fix/vuln-{}", epoch_seconds(ctx));
        ctx.deps
            .source_control
            .create_branch(&token, &owner, &repo, &branch, &base_ref.sha)
            .await
            .map_err(|e| NodeError::ToolInvocationFailed(e.to_string()))?;

        // Step 7: commit fixed content.
        let sha = ctx
            .deps
            .source_control
            .get_file_sha(&token, &owner, &repo, &path, &branch)
            .await
            .map_err(|e| NodeError::ToolInvocationFailed(e.to_string()))?;

        ctx.deps
            .source_control
            .update_file(
                &token,
                &owner,
                &repo,
                &path,
                &fixed_content,
                &sha,
                &format!("Fix: {vulnerability}"),
                &branch,
            )
            .await
            .map_err(|e| NodeError::ToolInvocationFailed(e.to_string()))?;

        // Step 8: open pull request.
        let pr = ctx
            .deps
            .source_control
            .create_pull_request(
                &token,
                &owner,
                &repo,
                &format!("Automated fix: {vulnerability}"),
                &format!("This PR addresses:\n\n{vulnerability}\n\nGenerated from scan results on {path}."),
                &branch,
                &base_branch,
            )
            .await
            .map_err(|e| NodeError::ToolInvocationFailed(e.to_string()))?;

        Ok(NodeResult::AutoFix(AutoFixResult { pr_url: pr.url, pr_number: pr.number, branch }))
    }
}

/// Deterministic within a single execution, varying across executions —
/// avoids calling `std::time::SystemTime::now()` which would collide with
/// repeated test runs on the same execution id.
fn epoch_seconds(ctx: &ExecutionContext) -> u64 {
    let bytes = ctx.execution_id.as_bytes();
    u64::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use serde_json::json;

    fn node_with(config: serde_json::Value) -> NodeDefinition {
        NodeDefinition { id: "f".into(), node_type: "auto-fix".into(), data: json!({"config": config}) }
    }

    #[tokio::test]
    async fn scenario_c_full_protocol_succeeds_with_mock_source_control() {
        let mut prior: ResultStore = IndexMap::new();
        prior.insert(
            "T".into(),
            NodeResult::Trigger(crate::result::TriggerResult {
                target: "https://github.com/acme/widgets".into(),
            }),
        );

        let node = node_with(json!({"path": "README.md"}));
        let result = AutoFixNode.execute(&node, &prior, &crate::mock::test_context()).await.unwrap();

        match result {
            NodeResult::AutoFix(f) => {
                assert!(f.branch.starts_with("fix/vuln-"));
                assert!(!f.pr_url.is_empty());
            }
            _ => panic!("expected AutoFix result"),
        }
    }

    #[tokio::test]
    async fn missing_path_and_no_inferable_path_fails() {
        let mut prior: ResultStore = IndexMap::new();
        prior.insert(
            "T".into(),
            NodeResult::Trigger(crate::result::TriggerResult {
                target: "https://github.com/acme/widgets".into(),
            }),
        );

        let node = node_with(json!({}));
        let result = AutoFixNode.execute(&node, &prior, &crate::mock::test_context()).await;
        assert!(matches!(result, Err(NodeError::NoPathInferable)));
    }

    #[test]
    fn infers_path_from_file_field_in_scanner_output() {
        let mut prior: ResultStore = IndexMap::new();
        prior.insert(
            "S".into(),
            NodeResult::Scanner(crate::result::ScannerResult {
                scanner: "semgrep-scan".into(),
                target: "example.com".into(),
                output: "finding in \"file\": \"src/auth.rs\" at line 12".into(),
                data: json!({}),
            }),
        );
        assert_eq!(infer_path(&prior), Some("src/auth.rs".to_string()));
    }
}
