//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::UserRole;
use super::status::UserStatus;

/// A registered user.
///
/// The approval workflow consults users for two things only: resolving
/// notification recipients (managers by department, admins globally) and
/// looking up a submitter's current department.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Human-readable display name.
    pub name: String,
    /// Email address; matched case-insensitively everywhere.
    pub email: String,
    /// Workflow role.
    pub role: UserRole,
    /// Department, if assigned.
    pub department: Option<String>,
    /// Account status.
    pub status: UserStatus,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// Last successful login time.
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Whether this user matches an opaque submitter reference, which may
    /// be an email address or a user id.
    pub fn matches_reference(&self, reference: &str) -> bool {
        self.email.eq_ignore_ascii_case(reference) || self.id.to_string() == reference
    }
}
