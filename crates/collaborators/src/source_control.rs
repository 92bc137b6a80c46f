//! Source-control collaborator — file reads, branches, commits, issues,
//! and pull requests against a GitHub-hosted repository.

use async_trait::async_trait;

use crate::error::CollaboratorError;

#[derive(Debug, Clone)]
pub struct GitReference {
    pub sha: String,
}

#[derive(Debug, Clone)]
pub struct CreatedIssue {
    pub id: u64,
    pub number: u64,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct CreatedPullRequest {
    pub number: u64,
    pub url: String,
}

/// Every call is bound to a caller-supplied token (the owner's credential,
/// resolved upstream via the user store).
#[async_trait]
pub trait SourceControl: Send + Sync {
    async fn get_file_content(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<String, CollaboratorError>;

    async fn create_issue(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        title: &str,
        body: &str,
    ) -> Result<CreatedIssue, CollaboratorError>;

    async fn get_reference(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        git_ref: &str,
    ) -> Result<GitReference, CollaboratorError>;

    async fn create_branch(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        new_branch: &str,
        base_sha: &str,
    ) -> Result<(), CollaboratorError>;

    async fn get_file_sha(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        path: &str,
        branch: &str,
    ) -> Result<String, CollaboratorError>;

    async fn update_file(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        path: &str,
        content: &str,
        sha: &str,
        message: &str,
        branch: &str,
    ) -> Result<(), CollaboratorError>;

    async fn create_pull_request(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        title: &str,
        body: &str,
        head: &str,
        base: &str,
    ) -> Result<CreatedPullRequest, CollaboratorError>;
}

/// Real implementation backed by [`octocrab`].
#[derive(Debug, Default, Clone)]
pub struct GithubSourceControl;

impl GithubSourceControl {
    pub fn new() -> Self {
        Self
    }

    fn client(token: &str) -> Result<octocrab::Octocrab, CollaboratorError> {
        octocrab::Octocrab::builder()
            .personal_token(token.to_string())
            .build()
            .map_err(|e| CollaboratorError::SourceControl(e.to_string()))
    }
}

#[async_trait]
impl SourceControl for GithubSourceControl {
    async fn get_file_content(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<String, CollaboratorError> {
        let client = Self::client(token)?;
        let content = client
            .repos(owner, repo)
            .get_content()
            .path(path)
            .send()
            .await
            .map_err(|e| CollaboratorError::SourceControl(e.to_string()))?;

        let file = content
            .items
            .into_iter()
            .next()
            .ok_or_else(|| CollaboratorError::SourceControl(format!("file not found: {path}")))?;

        file.decoded_content()
            .ok_or_else(|| CollaboratorError::SourceControl(format!("no content for {path}")))
    }

    async fn create_issue(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        title: &str,
        body: &str,
    ) -> Result<CreatedIssue, CollaboratorError> {
        let client = Self::client(token)?;
        let issue = client
            .issues(owner, repo)
            .create(title)
            .body(body)
            .send()
            .await
            .map_err(|e| CollaboratorError::SourceControl(e.to_string()))?;

        Ok(CreatedIssue {
            id: issue.id.0,
            number: issue.number,
            url: issue.html_url.to_string(),
        })
    }

    async fn get_reference(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        git_ref: &str,
    ) -> Result<GitReference, CollaboratorError> {
        let client = Self::client(token)?;
        let reference = client
            .repos(owner, repo)
            .get_ref(&octocrab::params::repos::Reference::Branch(git_ref.to_string()))
            .await
            .map_err(|e| CollaboratorError::SourceControl(e.to_string()))?;

        let sha = match reference.object {
            octocrab::models::repos::Object::Commit { sha, .. } => sha,
            octocrab::models::repos::Object::Tag { sha, .. } => sha,
            _ => return Err(CollaboratorError::SourceControl("unsupported ref object".into())),
        };

        Ok(GitReference { sha })
    }

    async fn create_branch(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        new_branch: &str,
        base_sha: &str,
    ) -> Result<(), CollaboratorError> {
        let client = Self::client(token)?;
        client
            .repos(owner, repo)
            .create_ref(
                &octocrab::params::repos::Reference::Branch(new_branch.to_string()),
                base_sha,
            )
            .await
            .map_err(|e| CollaboratorError::SourceControl(e.to_string()))?;
        Ok(())
    }

    async fn get_file_sha(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        path: &str,
        branch: &str,
    ) -> Result<String, CollaboratorError> {
        let client = Self::client(token)?;
        let content = client
            .repos(owner, repo)
            .get_content()
            .path(path)
            .r#ref(branch)
            .send()
            .await
            .map_err(|e| CollaboratorError::SourceControl(e.to_string()))?;

        content
            .items
            .into_iter()
            .next()
            .map(|item| item.sha)
            .ok_or_else(|| CollaboratorError::SourceControl(format!("file not found: {path}")))
    }

    async fn update_file(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        path: &str,
        content: &str,
        sha: &str,
        message: &str,
        branch: &str,
    ) -> Result<(), CollaboratorError> {
        let client = Self::client(token)?;
        client
            .repos(owner, repo)
            .update_file(path, message, content, sha)
            .branch(branch)
            .send()
            .await
            .map_err(|e| CollaboratorError::SourceControl(e.to_string()))?;
        Ok(())
    }

    async fn create_pull_request(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        title: &str,
        body: &str,
        head: &str,
        base: &str,
    ) -> Result<CreatedPullRequest, CollaboratorError> {
        let client = Self::client(token)?;
        let pr = client
            .pulls(owner, repo)
            .create(title, head, base)
            .body(body)
            .send()
            .await
            .map_err(|e| CollaboratorError::SourceControl(e.to_string()))?;

        Ok(CreatedPullRequest {
            number: pr.number,
            url: pr
                .html_url
                .map(|u| u.to_string())
                .unwrap_or_default(),
        })
    }
}
