//! Request DTOs.
//!
//! Query parameters use camelCase names (`requestedBy`, `assetId`,
//! `approvalId`); JSON bodies are snake_case.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use atrium_entity::approval::{ApprovalAction, ApprovalFilter, ApprovalStatus, Decision};
use atrium_entity::event::EventKind;

/// Body for `POST /approvals/submit` — a workflow submission.
///
/// Carries no id, status, or timestamp: those are always assigned
/// server-side, and a submission always starts at `pending_manager`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitApprovalRequest {
    /// The asset under review.
    #[validate(length(min = 1, message = "asset_id is required"))]
    pub asset_id: String,
    /// The proposed change kind.
    pub action: ApprovalAction,
    /// Email or user id of the submitter.
    #[validate(length(min = 1, message = "requested_by is required"))]
    pub requested_by: String,
    /// Free-text rationale.
    #[serde(default)]
    pub notes: Option<String>,
    /// Proposed field diff for edit actions.
    #[serde(default)]
    pub patch: Option<serde_json::Value>,
    /// Explicit department override.
    #[serde(default)]
    pub department: Option<String>,
}

/// Body for `POST /approvals` — the plain storage create.
///
/// The server assigns defaults: a fresh id, `pending_manager`, and the
/// current time, for whichever of those the caller omits.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateApprovalRequest {
    /// Caller-supplied id, if any.
    #[serde(default)]
    pub id: Option<String>,
    /// The asset under review.
    #[validate(length(min = 1, message = "asset_id is required"))]
    pub asset_id: String,
    /// The proposed change kind.
    pub action: ApprovalAction,
    /// Initial status; defaults to `pending_manager`.
    #[serde(default)]
    pub status: Option<ApprovalStatus>,
    /// Email or user id of the submitter.
    #[validate(length(min = 1, message = "requested_by is required"))]
    pub requested_by: String,
    /// Submission time; defaults to now.
    #[serde(default)]
    pub requested_at: Option<DateTime<Utc>>,
    /// Reviewer, if pre-populated.
    #[serde(default)]
    pub reviewed_by: Option<String>,
    /// Review time, if pre-populated.
    #[serde(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Free-text rationale.
    #[serde(default)]
    pub notes: Option<String>,
    /// Proposed field diff.
    #[serde(default)]
    pub patch: Option<serde_json::Value>,
    /// Department snapshot.
    #[serde(default)]
    pub department: Option<String>,
}

/// Body for `POST /approvals/{id}/forward`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ForwardApprovalRequest {
    /// The forwarding manager (email or user id).
    #[validate(length(min = 1, message = "manager is required"))]
    pub manager: String,
    /// Review notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Body for `POST /approvals/{id}/decision`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DecideApprovalRequest {
    /// The final decision.
    pub decision: Decision,
    /// The deciding admin (email or user id).
    #[validate(length(min = 1, message = "admin is required"))]
    pub admin: String,
    /// Decision notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Body for `POST /approvals/{id}/override`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OverrideApprovalRequest {
    /// The overriding admin (email or user id).
    #[validate(length(min = 1, message = "admin is required"))]
    pub admin: String,
    /// Override notes; a standard explanation is recorded when absent.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Body for `PUT /approvals/{id}/patch`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdatePatchRequest {
    /// The manager adjusting the diff.
    #[validate(length(min = 1, message = "manager is required"))]
    pub manager: String,
    /// The replacement diff.
    pub patch: serde_json::Value,
}

/// Body for `POST /approvals/{id}/comments`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddCommentRequest {
    /// Comment author (email or user id).
    #[validate(length(min = 1, message = "author is required"))]
    pub author: String,
    /// The reviewed field the comment refers to.
    #[validate(length(min = 1, message = "field is required"))]
    pub field: String,
    /// Comment text.
    #[validate(length(min = 1, message = "message is required"))]
    pub message: String,
}

/// Body for `POST /approval-events`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AppendEventRequest {
    /// Caller-supplied id, if any.
    #[serde(default)]
    pub id: Option<String>,
    /// The approval this event belongs to.
    #[validate(length(min = 1, message = "approval_id is required"))]
    pub approval_id: String,
    /// What happened.
    pub kind: EventKind,
    /// Who caused it.
    #[serde(default)]
    pub author: Option<String>,
    /// Free-text detail.
    #[serde(default)]
    pub message: Option<String>,
    /// Event time; defaults to now.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Query parameters for `GET /approvals`.
///
/// `assetId` is repeatable; axum-extra's `Query` collects repeats into
/// the vector.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ListApprovalsParams {
    /// Filter by status.
    #[serde(default)]
    pub status: Option<ApprovalStatus>,
    /// Filter by department (case-insensitive).
    #[serde(default)]
    pub department: Option<String>,
    /// Filter by submitter (case-insensitive).
    #[serde(default, rename = "requestedBy")]
    pub requested_by: Option<String>,
    /// Filter by any of these asset ids (case-insensitive).
    #[serde(default, rename = "assetId")]
    pub asset_id: Vec<String>,
}

impl ListApprovalsParams {
    /// Convert into the service-level filter.
    pub fn into_filter(self) -> ApprovalFilter {
        ApprovalFilter {
            status: self.status,
            department: self.department,
            requested_by: self.requested_by,
            asset_ids: if self.asset_id.is_empty() {
                None
            } else {
                Some(self.asset_id)
            },
        }
    }
}

/// Query parameters for `GET /approval-events`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListEventsParams {
    /// The approval whose trail to list.
    #[serde(rename = "approvalId")]
    pub approval_id: String,
}

/// Query parameters for `GET /notifications`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListNotificationsParams {
    /// Recipient email address.
    pub email: String,
    /// Maximum number of entries (newest first).
    #[serde(default = "default_notification_limit")]
    pub limit: i64,
}

fn default_notification_limit() -> i64 {
    50
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_params_into_filter() {
        let params = ListApprovalsParams {
            status: Some(ApprovalStatus::PendingManager),
            department: None,
            requested_by: Some("U1@X.com".to_string()),
            asset_id: vec!["AST-1".to_string()],
        };
        let filter = params.into_filter();
        assert_eq!(filter.status, Some(ApprovalStatus::PendingManager));
        assert_eq!(filter.asset_ids.as_deref(), Some(&["AST-1".to_string()][..]));
    }

    #[test]
    fn test_submit_request_rejects_blank_asset() {
        let request = SubmitApprovalRequest {
            asset_id: String::new(),
            action: ApprovalAction::Create,
            requested_by: "u1@x.com".to_string(),
            notes: None,
            patch: None,
            department: None,
        };
        assert!(request.validate().is_err());
    }
}
