//! Test doubles for `ExecutableNode` and the collaborator traits.
//!
//! Useful in unit and integration tests where a real node implementation,
//! external tool, AI provider, or collaborator is either unavailable or
//! irrelevant.

use std::sync::Arc;

use async_trait::async_trait;

use ai::AiAdapter;
use collaborators::{CollaboratorError, NotifyChannel, Notifier, SourceControl, UserRecord, UserStore};
use tools::{ToolAdapter, ToolError, ToolKind, ToolOutput};

use crate::traits::{ExecutionContext, HandlerDeps};

/// Tool adapter that always returns the fabricated mock payload, never
/// touching `PATH`.
#[derive(Default)]
pub struct MockToolAdapter;

#[async_trait]
impl ToolAdapter for MockToolAdapter {
    async fn exists(&self, _tool: ToolKind) -> bool {
        false
    }

    async fn run(&self, tool: ToolKind, target: &str) -> Result<ToolOutput, ToolError> {
        Ok(tools::mock::generate(tool, target).await)
    }
}

/// Source control double that succeeds on every call with fabricated data.
#[derive(Default)]
pub struct MockSourceControl;

#[async_trait]
impl SourceControl for MockSourceControl {
    async fn get_file_content(
        &self,
        _token: &str,
        _owner: &str,
        _repo: &str,
        _path: &str,
    ) -> Result<String, CollaboratorError> {
        Ok("fn vulnerable() { /* built via format! */ }".to_string())
    }

    async fn create_issue(
        &self,
        _token: &str,
        _owner: &str,
        _repo: &str,
        _title: &str,
        _body: &str,
    ) -> Result<collaborators::source_control::CreatedIssue, CollaboratorError> {
        Ok(collaborators::source_control::CreatedIssue {
            id: 1,
            number: 1,
            url: "https://github.com/acme/widgets/issues/1".to_string(),
        })
    }

    async fn get_reference(
        &self,
        _token: &str,
        _owner: &str,
        _repo: &str,
        _git_ref: &str,
    ) -> Result<collaborators::source_control::GitReference, CollaboratorError> {
        Ok(collaborators::source_control::GitReference { sha: "deadbeef".to_string() })
    }

    async fn create_branch(
        &self,
        _token: &str,
        _owner: &str,
        _repo: &str,
        _new_branch: &str,
        _base_sha: &str,
    ) -> Result<(), CollaboratorError> {
        Ok(())
    }

    async fn get_file_sha(
        &self,
        _token: &str,
        _owner: &str,
        _repo: &str,
        _path: &str,
        _branch: &str,
    ) -> Result<String, CollaboratorError> {
        Ok("cafebabe".to_string())
    }

    async fn update_file(
        &self,
        _token: &str,
        _owner: &str,
        _repo: &str,
        _path: &str,
        _content: &str,
        _sha: &str,
        _message: &str,
        _branch: &str,
    ) -> Result<(), CollaboratorError> {
        Ok(())
    }

    async fn create_pull_request(
        &self,
        _token: &str,
        _owner: &str,
        _repo: &str,
        _title: &str,
        _body: &str,
        _head: &str,
        _base: &str,
    ) -> Result<collaborators::source_control::CreatedPullRequest, CollaboratorError> {
        Ok(collaborators::source_control::CreatedPullRequest {
            number: 42,
            url: "https://github.com/acme/widgets/pull/42".to_string(),
        })
    }
}

/// Notifier double that always succeeds.
#[derive(Default)]
pub struct MockNotifier;

#[async_trait]
impl Notifier for MockNotifier {
    async fn send_report(
        &self,
        _channel: NotifyChannel,
        recipient: &str,
        _target: &str,
        _status: &str,
        _report_body: &str,
    ) -> Result<(), CollaboratorError> {
        if recipient.trim().is_empty() {
            return Err(CollaboratorError::UnknownRecipient(recipient.to_string()));
        }
        Ok(())
    }
}

/// Notifier double that always fails delivery (for soft-failure tests).
#[derive(Default)]
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send_report(
        &self,
        _channel: NotifyChannel,
        _recipient: &str,
        _target: &str,
        _status: &str,
        _report_body: &str,
    ) -> Result<(), CollaboratorError> {
        Err(CollaboratorError::Notification("simulated delivery failure".to_string()))
    }
}

/// User store double with one fixed record for any non-empty owner id.
#[derive(Default)]
pub struct MockUserStore;

#[async_trait]
impl UserStore for MockUserStore {
    async fn get_user(&self, owner_id: &str) -> Result<UserRecord, CollaboratorError> {
        if owner_id.is_empty() {
            return Err(CollaboratorError::UserNotFound(owner_id.to_string()));
        }
        Ok(UserRecord {
            email: "owner@example.com".to_string(),
            access_token: Some("ghp_mocktoken".to_string()),
        })
    }
}

/// Build an `ExecutionContext` wired to every mock collaborator above, with
/// no AI providers configured (so AI-dependent paths exercise the
/// `NoProviderConfigured` branch unless a test overrides `deps.ai`).
pub fn test_context() -> ExecutionContext {
    ExecutionContext {
        workflow_id: uuid::Uuid::new_v4(),
        execution_id: uuid::Uuid::new_v4(),
        owner: "owner-1".to_string(),
        deps: Arc::new(HandlerDeps {
            tools: Arc::new(MockToolAdapter),
            ai: Arc::new(AiAdapter::new(vec![])),
            source_control: Arc::new(MockSourceControl),
            notifier: Arc::new(MockNotifier),
            users: Arc::new(MockUserStore),
        }),
    }
}
