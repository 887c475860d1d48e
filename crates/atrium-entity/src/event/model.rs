//! Approval audit event entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use atrium_core::types::id::{ApprovalId, EventId};

use super::kind::EventKind;

/// An immutable audit trail entry for an approval request.
///
/// Events are append-only: never updated, never deleted. They are listed
/// ascending by `created_at` for display.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApprovalEvent {
    /// Unique event identifier (`AEV-nnnnnn`).
    pub id: EventId,
    /// The approval this event belongs to.
    pub approval_id: ApprovalId,
    /// What happened.
    pub kind: EventKind,
    /// Who caused it (email or user id), if known.
    pub author: Option<String>,
    /// Free-text detail.
    pub message: Option<String>,
    /// When the event occurred.
    pub created_at: DateTime<Utc>,
}

impl ApprovalEvent {
    /// Record a new event with a fresh id, stamped now.
    pub fn record(
        approval_id: ApprovalId,
        kind: EventKind,
        author: Option<String>,
        message: Option<String>,
    ) -> Self {
        Self {
            id: EventId::generate(),
            approval_id,
            kind,
            author,
            message,
            created_at: Utc::now(),
        }
    }

    /// Record a per-field review comment, formatted `"<field>: <message>"`.
    pub fn comment(approval_id: ApprovalId, author: &str, field: &str, message: &str) -> Self {
        Self::record(
            approval_id,
            EventKind::Comment,
            Some(author.to_string()),
            Some(format!("{field}: {message}")),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_formats_field_prefix() {
        let ev = ApprovalEvent::comment(
            ApprovalId::from_string("APR-100001"),
            "m1@x.com",
            "status",
            "should be retired, not disposed",
        );
        assert_eq!(ev.kind, EventKind::Comment);
        assert_eq!(
            ev.message.as_deref(),
            Some("status: should be retired, not disposed")
        );
        assert!(ev.id.as_str().starts_with("AEV-"));
    }
}
