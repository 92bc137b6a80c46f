//! User store collaborator — resolves an owner id to the contact details
//! and credentials handlers need.
//!
//! Authentication/authorization of the owner itself is out of scope; this
//! only answers "what does this owner's identity carry".

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::CollaboratorError;

#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    pub email: String,
    #[serde(default)]
    pub access_token: Option<String>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, owner_id: &str) -> Result<UserRecord, CollaboratorError>;
}

/// In-memory user store, seeded from the `WORKFLOW_OWNERS_JSON` environment
/// variable (a JSON object mapping owner id → `{email, access_token}`).
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserStore {
    users: HashMap<String, UserRecord>,
}

impl InMemoryUserStore {
    pub fn new(users: HashMap<String, UserRecord>) -> Self {
        Self { users }
    }

    /// Load from `WORKFLOW_OWNERS_JSON`, defaulting to an empty store if the
    /// variable is unset or malformed.
    pub fn from_env() -> Self {
        let raw = std::env::var("WORKFLOW_OWNERS_JSON").unwrap_or_default();
        let users = serde_json::from_str(&raw).unwrap_or_default();
        Self { users }
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get_user(&self, owner_id: &str) -> Result<UserRecord, CollaboratorError> {
        self.users
            .get(owner_id)
            .cloned()
            .ok_or_else(|| CollaboratorError::UserNotFound(owner_id.to_string()))
    }
}
