//! Department drift reconciliation.
//!
//! An approval stores the submitter's department as a snapshot taken at
//! submission time, used only for routing to the right manager pool.
//! After org changes the snapshots drift from the live user records;
//! this batch pass heals them on demand. No background loop runs it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

use atrium_cache::keys;
use atrium_core::result::AppResult;
use atrium_entity::approval::{ApprovalFilter, ApprovalRequest, ApprovalUpdate};

use crate::directory::DirectoryUser;

use super::service::ApprovalService;

/// Outcome counts of a department resync pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResyncReport {
    /// Rows whose department was rewritten.
    pub updated: u64,
    /// Rows examined.
    pub total: u64,
    /// Rows that could not be rewritten.
    pub errors: u64,
}

impl ApprovalService {
    /// Reconcile every approval's stored department against the
    /// submitter's current profile department, matched by email first,
    /// then by user id. Rows of unknown submitters are left untouched;
    /// only rows whose resolved department differs are rewritten. Emits
    /// no events.
    pub async fn resync_departments(&self) -> AppResult<ResyncReport> {
        let users = self.directory_snapshot().await;
        let mut by_email: HashMap<String, Option<String>> = HashMap::new();
        let mut by_id: HashMap<String, Option<String>> = HashMap::new();
        for user in &users {
            by_email.insert(user.email.to_lowercase(), user.department.clone());
            by_id.insert(user.id.clone(), user.department.clone());
        }

        let approvals = self.list(&ApprovalFilter::default()).await?;

        let mut report = ResyncReport {
            total: approvals.len() as u64,
            ..ResyncReport::default()
        };

        for approval in &approvals {
            let Some(target) = resolve_target(&by_email, &by_id, approval) else {
                continue;
            };
            if approval.department == target {
                continue;
            }

            let update = ApprovalUpdate::department_only(target);
            match self.apply_update(&approval.id, &update).await {
                Ok(Some(_)) => report.updated += 1,
                Ok(None) => {
                    warn!(id = %approval.id, "Approval vanished during resync");
                    report.errors += 1;
                }
                Err(e) => {
                    warn!(id = %approval.id, error = %e, "Failed to resync department");
                    report.errors += 1;
                }
            }
        }

        if report.updated > 0 {
            self.invalidate_lists().await;
        }

        info!(
            updated = report.updated,
            total = report.total,
            errors = report.errors,
            "Department resync complete"
        );
        Ok(report)
    }

    /// Snapshot the directory, refreshing the mirrored copy on success
    /// and falling back to it when the directory is unreachable.
    async fn directory_snapshot(&self) -> Vec<DirectoryUser> {
        match self.directory_ref().snapshot().await {
            Ok(users) => {
                self.mirror_ref().replace(keys::users_mirror(), &users);
                users
            }
            Err(e) => {
                warn!(error = %e, "Directory snapshot failed, reading mirror");
                self.mirror_ref().load::<DirectoryUser>(keys::users_mirror())
            }
        }
    }
}

/// The submitter's current department, when the submitter is known.
fn resolve_target(
    by_email: &HashMap<String, Option<String>>,
    by_id: &HashMap<String, Option<String>>,
    approval: &ApprovalRequest,
) -> Option<Option<String>> {
    let email_key = approval.requested_by.to_lowercase();
    by_email
        .get(&email_key)
        .or_else(|| by_id.get(&approval.requested_by))
        .cloned()
}
