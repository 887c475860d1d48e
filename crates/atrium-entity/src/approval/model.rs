//! Approval request entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

use atrium_core::types::id::ApprovalId;

use super::action::ApprovalAction;
use super::status::ApprovalStatus;

/// A request to create, edit, or decommission an asset, subject to
/// manager and admin sign-off.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApprovalRequest {
    /// Unique approval identifier (`APR-nnnnnn`).
    pub id: ApprovalId,
    /// The asset under review. Not validated for existence; a dangling
    /// reference is accepted.
    pub asset_id: String,
    /// The proposed change kind.
    pub action: ApprovalAction,
    /// Current workflow status.
    pub status: ApprovalStatus,
    /// Email or user id of the submitter.
    pub requested_by: String,
    /// Submission time; set once, immutable.
    pub requested_at: DateTime<Utc>,
    /// The last reviewer; overwritten on every transition.
    pub reviewed_by: Option<String>,
    /// Time of the last review transition.
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Free-text rationale; mutable per transition.
    pub notes: Option<String>,
    /// Proposed field diff; meaningful only when `action == Edit`.
    /// Applied to the asset at most once, on final approval.
    pub patch: Option<serde_json::Value>,
    /// Requester's department snapshot at submission time. May drift from
    /// the live user record until resynced.
    pub department: Option<String>,
}

/// Input for submitting a new approval request.
///
/// Status, id, and timestamps are never taken from the caller: submission
/// always produces a `pending_manager` request stamped server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitApproval {
    /// The asset under review.
    pub asset_id: String,
    /// The proposed change kind.
    pub action: ApprovalAction,
    /// Email or user id of the submitter.
    pub requested_by: String,
    /// Free-text rationale.
    #[serde(default)]
    pub notes: Option<String>,
    /// Proposed field diff for edit actions.
    #[serde(default)]
    pub patch: Option<serde_json::Value>,
    /// Explicit department override; when absent the submitter's profile
    /// department is used.
    #[serde(default)]
    pub department: Option<String>,
}

/// Typed partial update of an approval row.
///
/// Every mutable column is enumerated here; there is no way to write any
/// other column through an update. `None` means "leave unchanged",
/// `Some(None)` means "set to NULL" (wire: absent vs. explicit null).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApprovalUpdate {
    /// New workflow status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ApprovalStatus>,
    /// New reviewer.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "double_option")]
    pub reviewed_by: Option<Option<String>>,
    /// New review time.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "double_option")]
    pub reviewed_at: Option<Option<DateTime<Utc>>>,
    /// New rationale.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
    /// New proposed diff.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "double_option")]
    pub patch: Option<Option<serde_json::Value>>,
    /// New department snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "double_option")]
    pub department: Option<Option<String>>,
}

/// Deserialize a present-but-possibly-null field into `Some(Option<T>)`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

impl ApprovalUpdate {
    /// Whether the update would change nothing.
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.reviewed_by.is_none()
            && self.reviewed_at.is_none()
            && self.notes.is_none()
            && self.patch.is_none()
            && self.department.is_none()
    }

    /// Build the update applied by a review transition: status flip plus
    /// reviewer, review time, and notes overwrite.
    pub fn transition(
        status: ApprovalStatus,
        reviewer: &str,
        reviewed_at: DateTime<Utc>,
        notes: Option<String>,
    ) -> Self {
        Self {
            status: Some(status),
            reviewed_by: Some(Some(reviewer.to_string())),
            reviewed_at: Some(Some(reviewed_at)),
            notes: Some(notes),
            ..Self::default()
        }
    }

    /// Build an update that replaces only the proposed patch.
    pub fn patch_only(patch: serde_json::Value) -> Self {
        Self {
            patch: Some(Some(patch)),
            ..Self::default()
        }
    }

    /// Build an update that rewrites only the department snapshot.
    pub fn department_only(department: Option<String>) -> Self {
        Self {
            department: Some(department),
            ..Self::default()
        }
    }

    /// Apply this update to an in-memory record (mirror fallback path).
    pub fn apply_to(&self, record: &mut ApprovalRequest) {
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(reviewed_by) = &self.reviewed_by {
            record.reviewed_by = reviewed_by.clone();
        }
        if let Some(reviewed_at) = &self.reviewed_at {
            record.reviewed_at = *reviewed_at;
        }
        if let Some(notes) = &self.notes {
            record.notes = notes.clone();
        }
        if let Some(patch) = &self.patch {
            record.patch = patch.clone();
        }
        if let Some(department) = &self.department {
            record.department = department.clone();
        }
    }
}

/// Equality filters for listing approvals.
///
/// Department, requester, and asset-id comparisons are case-insensitive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApprovalFilter {
    /// Match a single status.
    pub status: Option<ApprovalStatus>,
    /// Match a department (case-insensitive).
    pub department: Option<String>,
    /// Match the submitter (case-insensitive).
    pub requested_by: Option<String>,
    /// Match any of the given asset ids (case-insensitive).
    pub asset_ids: Option<Vec<String>>,
}

impl ApprovalFilter {
    /// Whether a record satisfies the filter. This is the single source of
    /// predicate semantics, shared by the mirror fallback path.
    pub fn matches(&self, record: &ApprovalRequest) -> bool {
        if let Some(status) = self.status {
            if record.status != status {
                return false;
            }
        }
        if let Some(department) = &self.department {
            let stored = record.department.as_deref().unwrap_or("");
            if !stored.eq_ignore_ascii_case(department) {
                return false;
            }
        }
        if let Some(requested_by) = &self.requested_by {
            if !record.requested_by.eq_ignore_ascii_case(requested_by) {
                return false;
            }
        }
        if let Some(asset_ids) = &self.asset_ids {
            if !asset_ids.is_empty()
                && !asset_ids
                    .iter()
                    .any(|id| id.eq_ignore_ascii_case(&record.asset_id))
            {
                return false;
            }
        }
        true
    }

    /// Normalized key parts used for list-cache keys: lowercased, trimmed,
    /// `"all"` when unset, asset ids sorted for order independence.
    pub fn cache_key_parts(&self) -> [String; 4] {
        let part = |value: Option<&str>| -> String {
            match value.map(|v| v.trim().to_lowercase()) {
                Some(v) if !v.is_empty() => v,
                _ => "all".to_string(),
            }
        };
        let assets = match &self.asset_ids {
            Some(ids) if !ids.is_empty() => {
                let mut lowered: Vec<String> = ids.iter().map(|id| id.to_lowercase()).collect();
                lowered.sort();
                lowered.join(",")
            }
            _ => "all".to_string(),
        };
        [
            self.status.map(|s| s.as_str().to_string()).unwrap_or_else(|| "all".to_string()),
            part(self.department.as_deref()),
            part(self.requested_by.as_deref()),
            assets,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(department: Option<&str>) -> ApprovalRequest {
        ApprovalRequest {
            id: ApprovalId::from_string("APR-100001"),
            asset_id: "AST-1".to_string(),
            action: ApprovalAction::Edit,
            status: ApprovalStatus::PendingManager,
            requested_by: "u1@x.com".to_string(),
            requested_at: Utc::now(),
            reviewed_by: None,
            reviewed_at: None,
            notes: None,
            patch: None,
            department: department.map(str::to_string),
        }
    }

    #[test]
    fn test_filter_department_is_case_insensitive() {
        let record = sample(Some("Ops"));
        let filter = ApprovalFilter {
            department: Some("ops".to_string()),
            ..ApprovalFilter::default()
        };
        assert!(filter.matches(&record));
    }

    #[test]
    fn test_filter_asset_ids_any_match() {
        let record = sample(None);
        let filter = ApprovalFilter {
            asset_ids: Some(vec!["ast-1".to_string(), "AST-9".to_string()]),
            ..ApprovalFilter::default()
        };
        assert!(filter.matches(&record));

        let miss = ApprovalFilter {
            asset_ids: Some(vec!["AST-2".to_string()]),
            ..ApprovalFilter::default()
        };
        assert!(!miss.matches(&record));
    }

    #[test]
    fn test_cache_key_parts_normalize() {
        let filter = ApprovalFilter {
            status: Some(ApprovalStatus::PendingAdmin),
            department: Some("  Ops ".to_string()),
            requested_by: None,
            asset_ids: Some(vec!["B-2".to_string(), "a-1".to_string()]),
        };
        assert_eq!(
            filter.cache_key_parts(),
            [
                "pending_admin".to_string(),
                "ops".to_string(),
                "all".to_string(),
                "a-1,b-2".to_string()
            ]
        );
    }

    #[test]
    fn test_update_null_vs_absent() {
        let parsed: ApprovalUpdate =
            serde_json::from_str(r#"{"notes": null, "status": "pending_admin"}"#).unwrap();
        assert_eq!(parsed.notes, Some(None));
        assert!(parsed.reviewed_by.is_none());
        assert_eq!(parsed.status, Some(ApprovalStatus::PendingAdmin));
    }

    #[test]
    fn test_transition_apply_to() {
        let mut record = sample(None);
        let now = Utc::now();
        let update = ApprovalUpdate::transition(
            ApprovalStatus::PendingAdmin,
            "m1@x.com",
            now,
            Some("looks fine".to_string()),
        );
        update.apply_to(&mut record);
        assert_eq!(record.status, ApprovalStatus::PendingAdmin);
        assert_eq!(record.reviewed_by.as_deref(), Some("m1@x.com"));
        assert_eq!(record.reviewed_at, Some(now));
        assert_eq!(record.notes.as_deref(), Some("looks fine"));
    }
}
