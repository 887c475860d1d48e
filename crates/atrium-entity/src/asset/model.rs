//! Asset entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A tracked facility asset.
///
/// Assets are collaborators of the approval workflow: an approved edit
/// request applies its patch here. Full asset management lives elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Asset {
    /// Opaque asset identifier (e.g. `AST-1`).
    pub id: String,
    /// Asset name.
    pub name: String,
    /// Operational status (e.g. `active`, `retired`).
    pub status: String,
    /// Physical location.
    pub location: Option<String>,
    /// Owning department.
    pub department: Option<String>,
    /// Assigned user (email), if any.
    pub assignee: Option<String>,
    /// When the asset was registered.
    pub created_at: DateTime<Utc>,
    /// When the asset was last modified.
    pub updated_at: DateTime<Utc>,
}
