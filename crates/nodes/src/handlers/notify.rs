//! Terminal publishing handlers: `email`, `slack`, `github-issue`. All
//! three aggregate prior output/data into a text report
//! and are tolerant of delivery failure — only `github-issue`'s missing
//! credential precondition is a hard failure.

use async_trait::async_trait;
use collaborators::NotifyChannel;

use crate::result::{NodeResult, NotificationResult, TerminalStatus};
use crate::traits::{ExecutionContext, NodeDefinition, ResultStore};
use crate::{ExecutableNode, NodeError};

fn aggregate_prior(prior_results: &ResultStore) -> String {
    let mut report = String::new();
    for (id, result) in prior_results {
        if let NodeResult::Scanner(s) = result {
            report.push_str(&format!("Node {id} ({}) Output:\n{}\n\n", s.scanner, s.output));
        }
    }
    report
}

async fn build_report(ctx: &ExecutionContext, prior_results: &ResultStore) -> String {
    let raw = aggregate_prior(prior_results);
    match ctx.deps.ai.generate_security_recommendations(&raw).await {
        Ok(summary) => summary,
        Err(_) => raw,
    }
}

fn target_of(prior_results: &ResultStore) -> Option<String> {
    prior_results.values().find_map(|r| r.target()).map(|s| s.to_string())
}

pub struct EmailNode;

#[async_trait]
impl ExecutableNode for EmailNode {
    async fn execute(
        &self,
        node: &NodeDefinition,
        prior_results: &ResultStore,
        ctx: &ExecutionContext,
    ) -> Result<NodeResult, NodeError> {
        let target = target_of(prior_results);

        let recipient = match resolve_recipient(node, ctx).await {
            Ok(recipient) => recipient,
            Err(e) => {
                return Ok(NodeResult::Notification(NotificationResult {
                    channel: "email".to_string(),
                    recipient: String::new(),
                    target,
                    status: TerminalStatus::Failed,
                    error: Some(e),
                    issue_number: None,
                    issue_url: None,
                }));
            }
        };
        let report = build_report(ctx, prior_results).await;

        let (status, error) = match ctx
            .deps
            .notifier
            .send_report(NotifyChannel::Email, &recipient, target.as_deref().unwrap_or(""), "completed", &report)
            .await
        {
            Ok(()) => (TerminalStatus::Sent, None),
            Err(e) => (TerminalStatus::Failed, Some(e.to_string())),
        };

        Ok(NodeResult::Notification(NotificationResult {
            channel: "email".to_string(),
            recipient,
            target,
            status,
            error,
            issue_number: None,
            issue_url: None,
        }))
    }
}

pub struct SlackNode;

#[async_trait]
impl ExecutableNode for SlackNode {
    async fn execute(
        &self,
        node: &NodeDefinition,
        prior_results: &ResultStore,
        ctx: &ExecutionContext,
    ) -> Result<NodeResult, NodeError> {
        let target = target_of(prior_results);

        let recipient = match resolve_recipient(node, ctx).await {
            Ok(recipient) => recipient,
            Err(e) => {
                return Ok(NodeResult::Notification(NotificationResult {
                    channel: "slack".to_string(),
                    recipient: String::new(),
                    target,
                    status: TerminalStatus::Failed,
                    error: Some(e),
                    issue_number: None,
                    issue_url: None,
                }));
            }
        };
        let report = build_report(ctx, prior_results).await;

        let (status, error) = match ctx
            .deps
            .notifier
            .send_report(NotifyChannel::Slack, &recipient, target.as_deref().unwrap_or(""), "completed", &report)
            .await
        {
            Ok(()) => (TerminalStatus::Sent, None),
            Err(e) => (TerminalStatus::Failed, Some(e.to_string())),
        };

        Ok(NodeResult::Notification(NotificationResult {
            channel: "slack".to_string(),
            recipient,
            target,
            status,
            error,
            issue_number: None,
            issue_url: None,
        }))
    }
}

/// Recipient resolution: node config, else the owner's default email. An
/// unresolvable recipient is the caller's problem to report as a soft
/// `Failed` notification, not a hard `NodeError` — there's no retry or
/// fallback channel that would make it fatal to the execution.
async fn resolve_recipient(node: &NodeDefinition, ctx: &ExecutionContext) -> Result<String, String> {
    if let Some(configured) = node.data.get("config").and_then(|c| c.get("email")).and_then(|v| v.as_str()) {
        return Ok(configured.to_string());
    }
    if let Some(configured) = node.data.get("config").and_then(|c| c.get("channel")).and_then(|v| v.as_str()) {
        return Ok(configured.to_string());
    }
    let user = ctx.deps.users.get_user(&ctx.owner).await.map_err(|e| e.to_string())?;
    Ok(user.email)
}

pub struct GithubIssueNode;

#[async_trait]
impl ExecutableNode for GithubIssueNode {
    async fn execute(
        &self,
        node: &NodeDefinition,
        prior_results: &ResultStore,
        ctx: &ExecutionContext,
    ) -> Result<NodeResult, NodeError> {
        let target = target_of(prior_results);
        let report = build_report(ctx, prior_results).await;

        let user = ctx.deps.users.get_user(&ctx.owner).await.map_err(|_| NodeError::MissingCredential)?;
        let token = user.access_token.ok_or(NodeError::MissingCredential)?;

        let (owner, repo) = resolve_owner_repo(node, target.as_deref())?;
        let title = format!("Security scan findings for {}", target.as_deref().unwrap_or(&repo));

        match ctx.deps.source_control.create_issue(&token, &owner, &repo, &title, &report).await {
            Ok(issue) => Ok(NodeResult::Notification(NotificationResult {
                channel: "github-issue".to_string(),
                recipient: format!("{owner}/{repo}"),
                target,
                status: TerminalStatus::Created,
                error: None,
                issue_number: Some(issue.number),
                issue_url: Some(issue.url),
            })),
            Err(e) => Ok(NodeResult::Notification(NotificationResult {
                channel: "github-issue".to_string(),
                recipient: format!("{owner}/{repo}"),
                target,
                status: TerminalStatus::Failed,
                error: Some(e.to_string()),
                issue_number: None,
                issue_url: None,
            })),
        }
    }
}

/// Parse `owner/repo` from node config, else from a
/// `https://github.com/<owner>/<repo>` target.
pub(crate) fn resolve_owner_repo(node: &NodeDefinition, target: Option<&str>) -> Result<(String, String), NodeError> {
    if let (Some(owner), Some(repo)) = (
        node.data.get("config").and_then(|c| c.get("owner")).and_then(|v| v.as_str()),
        node.data.get("config").and_then(|c| c.get("repo")).and_then(|v| v.as_str()),
    ) {
        return Ok((owner.to_string(), repo.to_string()));
    }

    let target = target.ok_or(NodeError::MissingContext("no owner/repo resolvable".to_string()))?;
    let trimmed = target.trim_start_matches("https://github.com/").trim_end_matches('/');
    let mut parts = trimmed.splitn(2, '/');
    match (parts.next(), parts.next()) {
        (Some(owner), Some(repo)) if !owner.is_empty() && !repo.is_empty() => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(NodeError::MissingContext("target is not a github.com owner/repo URL".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use serde_json::json;

    fn node(node_type: &str, config: serde_json::Value) -> NodeDefinition {
        NodeDefinition { id: "n".into(), node_type: node_type.into(), data: json!({"config": config}) }
    }

    #[tokio::test]
    async fn scenario_a_email_sends_with_mock_notifier() {
        let node = node("email", json!({"email": "a@b.c"}));
        let result = EmailNode.execute(&node, &IndexMap::new(), &crate::mock::test_context()).await.unwrap();
        match result {
            NodeResult::Notification(n) => assert_eq!(n.status, TerminalStatus::Sent),
            _ => panic!("expected Notification result"),
        }
    }

    #[tokio::test]
    async fn scenario_d_failing_notifier_records_status_failed_not_node_error() {
        let mut ctx = crate::mock::test_context();
        ctx.deps = std::sync::Arc::new(crate::traits::HandlerDeps {
            tools: ctx.deps.tools.clone(),
            ai: ctx.deps.ai.clone(),
            source_control: ctx.deps.source_control.clone(),
            notifier: std::sync::Arc::new(crate::mock::FailingNotifier),
            users: ctx.deps.users.clone(),
        });

        let node = node("email", json!({"email": "x@x"}));
        let result = EmailNode.execute(&node, &IndexMap::new(), &ctx).await.unwrap();
        match result {
            NodeResult::Notification(n) => {
                assert_eq!(n.status, TerminalStatus::Failed);
                assert!(n.error.is_some());
            }
            _ => panic!("expected Notification result"),
        }
    }

    #[tokio::test]
    async fn unresolvable_recipient_is_a_soft_failure_not_a_node_error() {
        let mut ctx = crate::mock::test_context();
        ctx.owner = String::new();

        let node = node("email", json!({}));
        let result = EmailNode.execute(&node, &IndexMap::new(), &ctx).await.unwrap();
        match result {
            NodeResult::Notification(n) => {
                assert_eq!(n.status, TerminalStatus::Failed);
                assert!(n.error.is_some());
            }
            _ => panic!("expected Notification result"),
        }
    }

    #[test]
    fn resolves_owner_repo_from_github_target() {
        let node = node("github-issue", json!({}));
        let (owner, repo) = resolve_owner_repo(&node, Some("https://github.com/acme/widgets")).unwrap();
        assert_eq!(owner, "acme");
        assert_eq!(repo, "widgets");
    }

    #[test]
    fn missing_owner_repo_is_missing_context() {
        let node = node("github-issue", json!({}));
        let result = resolve_owner_repo(&node, None);
        assert!(matches!(result, Err(NodeError::MissingContext(_))));
    }
}
