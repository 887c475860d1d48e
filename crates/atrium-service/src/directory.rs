//! User directory collaborator port.
//!
//! The workflow needs three lookups from the directory: a submitter's
//! current department (submission-time snapshot and resync), a display
//! name for notification bodies, and the full directory snapshot the
//! resync walks. Submitter references are opaque — an email address or
//! a user id — and email matching is case-insensitive.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use atrium_core::result::AppResult;
use atrium_database::repositories::user::UserRepository;
use atrium_entity::user::User;

/// A directory entry as the workflow sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryUser {
    /// User id, stringified for comparison against opaque references.
    pub id: String,
    /// Email address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Current department.
    pub department: Option<String>,
}

impl From<User> for DirectoryUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email,
            name: user.name,
            department: user.department,
        }
    }
}

/// Read-only view of the user directory.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolve the current department of a submitter reference.
    ///
    /// The outer `Option` distinguishes "user not found" (`None`) from
    /// "user found, with or without a department" (`Some(..)`) — resync
    /// must leave rows of unknown users untouched.
    async fn department_of(&self, reference: &str) -> AppResult<Option<Option<String>>>;

    /// Resolve a display name for notification bodies.
    async fn display_name(&self, reference: &str) -> AppResult<Option<String>>;

    /// Snapshot the whole directory.
    async fn snapshot(&self) -> AppResult<Vec<DirectoryUser>>;
}

/// Directory backed by the local PostgreSQL repository.
#[derive(Debug, Clone)]
pub struct PgUserDirectory {
    users: Arc<UserRepository>,
}

impl PgUserDirectory {
    /// Create a new PostgreSQL-backed directory.
    pub fn new(users: Arc<UserRepository>) -> Self {
        Self { users }
    }

    async fn resolve(&self, reference: &str) -> AppResult<Option<User>> {
        if let Some(user) = self.users.find_by_email(reference).await? {
            return Ok(Some(user));
        }
        if let Ok(id) = reference.parse::<Uuid>() {
            return self.users.find_by_id(id).await;
        }
        Ok(None)
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn department_of(&self, reference: &str) -> AppResult<Option<Option<String>>> {
        Ok(self.resolve(reference).await?.map(|user| user.department))
    }

    async fn display_name(&self, reference: &str) -> AppResult<Option<String>> {
        Ok(self.resolve(reference).await?.map(|user| user.name))
    }

    async fn snapshot(&self) -> AppResult<Vec<DirectoryUser>> {
        let users = self.users.find_all().await?;
        Ok(users.into_iter().map(DirectoryUser::from).collect())
    }
}
