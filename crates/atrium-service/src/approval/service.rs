//! The approval workflow service.
//!
//! Owns the state machine (`pending_manager → pending_admin →
//! approved/rejected`, with an admin-override shortcut) and the
//! availability policy: every operation tries the remote store first
//! and degrades exactly once to the local mirror, logging a warning and
//! never surfacing remote unavailability to the caller. Callers see an
//! error only for invalid input, for an illegal state transition, or —
//! as `Ok(None)` — when an id exists in neither the remote store nor
//! the mirror.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use atrium_cache::{keys, ListCache, MirrorStore};
use atrium_core::error::AppError;
use atrium_core::result::AppResult;
use atrium_core::types::id::ApprovalId;
use atrium_entity::approval::{
    ApprovalFilter, ApprovalRequest, ApprovalStatus, ApprovalUpdate, Decision, SubmitApproval,
};
use atrium_entity::asset::AssetPatch;
use atrium_entity::event::{ApprovalEvent, EventKind};

use crate::asset::AssetUpdater;
use crate::directory::UserDirectory;
use crate::notify::ApprovalNotifier;

use super::store::{ApprovalStore, StorePatch};

/// Notes recorded when an admin override supplies none.
const OVERRIDE_NOTES: &str = "admin approved it without level 1 approval";

/// Orchestrates approval submissions, reviews, and decisions.
pub struct ApprovalService {
    store: Arc<dyn ApprovalStore>,
    mirror: Arc<MirrorStore>,
    lists: Arc<ListCache>,
    notifier: Arc<dyn ApprovalNotifier>,
    assets: Arc<dyn AssetUpdater>,
    directory: Arc<dyn UserDirectory>,
}

impl ApprovalService {
    /// Create a new approval service.
    pub fn new(
        store: Arc<dyn ApprovalStore>,
        mirror: Arc<MirrorStore>,
        lists: Arc<ListCache>,
        notifier: Arc<dyn ApprovalNotifier>,
        assets: Arc<dyn AssetUpdater>,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            store,
            mirror,
            lists,
            notifier,
            assets,
            directory,
        }
    }

    /// Submit a new approval request.
    ///
    /// The status is forced to `pending_manager` no matter what the
    /// caller sends. The department snapshot is resolved by priority:
    /// explicit value → submitter's current profile department → none.
    /// The asset id is deliberately not validated for existence.
    pub async fn submit(&self, input: SubmitApproval) -> AppResult<ApprovalRequest> {
        require(&input.asset_id, "asset_id")?;
        require(&input.requested_by, "requested_by")?;

        let department = self
            .resolve_department(input.department.clone(), &input.requested_by)
            .await;

        let record = ApprovalRequest {
            id: ApprovalId::generate(),
            asset_id: input.asset_id.trim().to_string(),
            action: input.action,
            status: ApprovalStatus::PendingManager,
            requested_by: input.requested_by.trim().to_string(),
            requested_at: Utc::now(),
            reviewed_by: None,
            reviewed_at: None,
            notes: input.notes,
            patch: input.patch,
            department,
        };

        let event = ApprovalEvent::record(
            record.id.clone(),
            EventKind::Submitted,
            Some(record.requested_by.clone()),
            Some(format!(
                "{} requested for asset {}",
                record.action, record.asset_id
            )),
        );

        let record = match self.store.create(&record, &event).await {
            Ok(created) => {
                self.mirror_upsert(&created);
                self.mirror_push_event(&event);
                created
            }
            Err(e) => {
                warn!(id = %record.id, error = %e, "Remote submit failed, keeping approval in mirror only");
                self.mirror_upsert(&record);
                self.mirror_push_event(&event);
                record
            }
        };
        self.invalidate_lists().await;

        if let Err(e) = self.notifier.notify_submitted(&record).await {
            warn!(id = %record.id, error = %e, "Failed to notify managers of submission");
        }

        info!(id = %record.id, asset_id = %record.asset_id, "Approval submitted");
        Ok(record)
    }

    /// Forward a pending request to the admins.
    ///
    /// Only legal from `pending_manager`; any other status is a
    /// conflict. Returns `None` when the id exists nowhere.
    pub async fn forward_to_admin(
        &self,
        id: &ApprovalId,
        manager: &str,
        notes: Option<String>,
    ) -> AppResult<Option<ApprovalRequest>> {
        require(manager, "manager")?;

        let Some(current) = self.load_current(id).await else {
            return Ok(None);
        };
        if !current.status.can_forward() {
            return Err(AppError::conflict(format!(
                "Approval {id} cannot be forwarded from status '{}'",
                current.status
            )));
        }

        let update = ApprovalUpdate::transition(
            ApprovalStatus::PendingAdmin,
            manager,
            Utc::now(),
            notes.clone(),
        );
        let event = ApprovalEvent::record(
            id.clone(),
            EventKind::Forwarded,
            Some(manager.to_string()),
            notes.clone(),
        );

        let Some(updated) = self.write_update(id, &update, &event).await else {
            return Ok(None);
        };
        self.invalidate_lists().await;

        if let Err(e) = self
            .notifier
            .notify_forwarded(&updated, manager, notes.as_deref())
            .await
        {
            warn!(id = %id, error = %e, "Failed to notify admins of forwarding");
        }

        info!(id = %id, manager, "Approval forwarded to admins");
        Ok(Some(updated))
    }

    /// Record the final decision on a request.
    ///
    /// Terminal requests cannot be re-decided. When an edit request is
    /// approved with a non-empty patch, the patch is applied to the
    /// asset — transactionally with the status flip when the remote
    /// store supports it, best-effort on the mirror-fallback path.
    pub async fn decide_final(
        &self,
        id: &ApprovalId,
        decision: Decision,
        admin: &str,
        notes: Option<String>,
    ) -> AppResult<Option<ApprovalRequest>> {
        require(admin, "admin")?;

        let Some(current) = self.load_current(id).await else {
            return Ok(None);
        };
        if !current.status.can_decide() {
            return Err(AppError::conflict(format!(
                "Approval {id} already has a final decision ('{}')",
                current.status
            )));
        }

        let update =
            ApprovalUpdate::transition(decision.into_status(), admin, Utc::now(), notes.clone());
        let decision_event = ApprovalEvent::record(
            id.clone(),
            match decision {
                Decision::Approved => EventKind::Approved,
                Decision::Rejected => EventKind::Rejected,
            },
            Some(admin.to_string()),
            notes.clone(),
        );

        let patch = pending_patch(&current, decision).map(|asset_patch| StorePatch {
            asset_id: current.asset_id.clone(),
            patch: asset_patch,
            applied_event: ApprovalEvent::record(
                id.clone(),
                EventKind::Applied,
                Some(admin.to_string()),
                Some(format!("patch applied to asset {}", current.asset_id)),
            ),
        });

        let updated = match self
            .store
            .finalize(id, &update, &decision_event, patch.clone())
            .await
        {
            Ok(Some(outcome)) => {
                self.mirror_upsert(&outcome.approval);
                self.mirror_push_event(&decision_event);
                if outcome.patch_applied {
                    if let Some(patch) = &patch {
                        self.mirror_push_event(&patch.applied_event);
                    }
                }
                outcome.approval
            }
            Ok(None) => return Ok(None),
            Err(e) => {
                warn!(id = %id, error = %e, "Remote decision failed, applying to mirror only");
                let Some(updated) = self.mirror_apply(id, &update) else {
                    return Ok(None);
                };
                self.mirror_push_event(&decision_event);
                // Best-effort patch application; the approval stays
                // decided even when the asset write fails.
                if let Some(patch) = &patch {
                    match self.assets.apply_patch(&patch.asset_id, &patch.patch).await {
                        Ok(true) => self.mirror_push_event(&patch.applied_event),
                        Ok(false) => {}
                        Err(e) => {
                            warn!(id = %id, asset_id = %patch.asset_id, error = %e, "Patch could not be applied")
                        }
                    }
                }
                updated
            }
        };
        self.invalidate_lists().await;

        if let Err(e) = self
            .notifier
            .notify_decision(&updated, admin, decision, notes.as_deref())
            .await
        {
            warn!(id = %id, error = %e, "Failed to notify requester of decision");
        }

        info!(id = %id, decision = %decision, admin, "Approval decided");
        Ok(Some(updated))
    }

    /// Approve a request directly, skipping the manager step.
    ///
    /// The bypass is intentional and always leaves a trace: when no
    /// notes are supplied, an explanatory override note is recorded.
    pub async fn admin_override_approve(
        &self,
        id: &ApprovalId,
        admin: &str,
        notes: Option<String>,
    ) -> AppResult<Option<ApprovalRequest>> {
        let notes = match notes {
            Some(n) if !n.trim().is_empty() => n,
            _ => OVERRIDE_NOTES.to_string(),
        };
        self.decide_final(id, Decision::Approved, admin, Some(notes))
            .await
    }

    /// Replace the proposed patch without touching the status, letting a
    /// manager adjust the diff before forwarding.
    pub async fn update_patch(
        &self,
        id: &ApprovalId,
        manager: &str,
        patch: serde_json::Value,
    ) -> AppResult<Option<ApprovalRequest>> {
        require(manager, "manager")?;

        if self.load_current(id).await.is_none() {
            return Ok(None);
        }

        let update = ApprovalUpdate::patch_only(patch);
        let event = ApprovalEvent::record(
            id.clone(),
            EventKind::PatchUpdated,
            Some(manager.to_string()),
            Some("proposed patch replaced".to_string()),
        );

        let Some(updated) = self.write_update(id, &update, &event).await else {
            return Ok(None);
        };
        self.invalidate_lists().await;
        Ok(Some(updated))
    }

    /// Apply a generic typed partial update (the PUT surface). No state
    /// guard, no event, no notification — storage semantics.
    pub async fn apply_update(
        &self,
        id: &ApprovalId,
        update: &ApprovalUpdate,
    ) -> AppResult<Option<ApprovalRequest>> {
        let updated = match self.store.update(id, update, None).await {
            Ok(Some(updated)) => {
                self.mirror_upsert(&updated);
                Some(updated)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(id = %id, error = %e, "Remote update failed, applying to mirror only");
                self.mirror_apply(id, update)
            }
        };
        self.invalidate_lists().await;
        Ok(updated)
    }

    /// List approvals matching the filter, newest submissions first.
    ///
    /// Successful remote reads overwrite the mirror and are cached for a
    /// short TTL; when the remote store is unreachable the mirror is
    /// filtered with identical predicate semantics, so a caller always
    /// reads its own mirrored writes.
    pub async fn list(&self, filter: &ApprovalFilter) -> AppResult<Vec<ApprovalRequest>> {
        let key = keys::approvals_list(&filter.cache_key_parts());
        if let Some(cached) = self.lists.get::<ApprovalRequest>(&key).await {
            return Ok(cached);
        }

        match self.store.list(filter).await {
            Ok(items) => {
                if !items.is_empty() {
                    self.mirror.replace(keys::approvals_mirror(), &items);
                }
                self.lists.put(&key, &items).await;
                Ok(items)
            }
            Err(e) => {
                warn!(error = %e, "Remote list failed, filtering mirror");
                let mut items: Vec<ApprovalRequest> = self
                    .mirror
                    .load::<ApprovalRequest>(keys::approvals_mirror())
                    .into_iter()
                    .filter(|record| filter.matches(record))
                    .collect();
                items.sort_by(|a, b| b.requested_at.cmp(&a.requested_at));
                Ok(items)
            }
        }
    }

    /// Fetch one approval, mirror fallback included.
    pub async fn get(&self, id: &ApprovalId) -> AppResult<Option<ApprovalRequest>> {
        Ok(self.load_current(id).await)
    }

    /// List the audit events of one approval, oldest first.
    pub async fn list_events(&self, approval_id: &ApprovalId) -> AppResult<Vec<ApprovalEvent>> {
        match self.store.list_events(approval_id).await {
            Ok(events) => Ok(events),
            Err(e) => {
                warn!(approval_id = %approval_id, error = %e, "Remote event list failed, reading mirror");
                let mut events: Vec<ApprovalEvent> = self
                    .mirror
                    .load::<ApprovalEvent>(keys::approval_events_mirror())
                    .into_iter()
                    .filter(|event| event.approval_id == *approval_id)
                    .collect();
                events.sort_by(|a, b| a.created_at.cmp(&b.created_at));
                Ok(events)
            }
        }
    }

    /// Append a per-field review comment, formatted `"<field>: <message>"`.
    pub async fn add_comment(
        &self,
        approval_id: &ApprovalId,
        author: &str,
        field: &str,
        message: &str,
    ) -> AppResult<ApprovalEvent> {
        require(author, "author")?;
        require(field, "field")?;
        require(message, "message")?;

        let event = ApprovalEvent::comment(approval_id.clone(), author, field, message);
        match self.store.append_event(&event).await {
            Ok(stored) => {
                self.mirror_push_event(&stored);
                Ok(stored)
            }
            Err(e) => {
                warn!(approval_id = %approval_id, error = %e, "Remote comment failed, keeping in mirror only");
                self.mirror_push_event(&event);
                Ok(event)
            }
        }
    }

    /// Append a raw audit event (the POST /approval-events surface).
    pub async fn append_event(&self, event: &ApprovalEvent) -> AppResult<ApprovalEvent> {
        match self.store.append_event(event).await {
            Ok(stored) => {
                self.mirror_push_event(&stored);
                Ok(stored)
            }
            Err(e) => {
                warn!(approval_id = %event.approval_id, error = %e, "Remote event append failed, keeping in mirror only");
                self.mirror_push_event(event);
                Ok(event.clone())
            }
        }
    }

    /// Drop every cached approvals list.
    pub async fn invalidate_lists(&self) {
        self.lists
            .invalidate_prefix(&keys::approvals_list_prefix())
            .await;
    }

    // ── Internals ──────────────────────────────────────────────

    /// Directory access for sibling modules (resync).
    pub(crate) fn directory_ref(&self) -> &dyn UserDirectory {
        self.directory.as_ref()
    }

    /// Mirror access for sibling modules (resync).
    pub(crate) fn mirror_ref(&self) -> &MirrorStore {
        &self.mirror
    }

    /// Resolve the department snapshot: explicit value wins, then the
    /// submitter's current profile department, then none. Values are
    /// trimmed; blanks count as absent.
    async fn resolve_department(
        &self,
        explicit: Option<String>,
        requested_by: &str,
    ) -> Option<String> {
        if let Some(department) = normalize(explicit) {
            return Some(department);
        }
        match self.directory.department_of(requested_by).await {
            Ok(Some(department)) => normalize(department),
            Ok(None) => None,
            Err(e) => {
                warn!(requested_by, error = %e, "Department lookup failed");
                None
            }
        }
    }

    /// Fetch the current record, falling back to the mirror.
    async fn load_current(&self, id: &ApprovalId) -> Option<ApprovalRequest> {
        match self.store.fetch(id).await {
            Ok(found) => found,
            Err(e) => {
                warn!(id = %id, error = %e, "Remote fetch failed, reading mirror");
                self.mirror_find(id)
            }
        }
    }

    /// Write an update + event remotely, degrading to the mirror.
    async fn write_update(
        &self,
        id: &ApprovalId,
        update: &ApprovalUpdate,
        event: &ApprovalEvent,
    ) -> Option<ApprovalRequest> {
        match self.store.update(id, update, Some(event)).await {
            Ok(Some(updated)) => {
                self.mirror_upsert(&updated);
                self.mirror_push_event(event);
                Some(updated)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(id = %id, error = %e, "Remote update failed, applying to mirror only");
                let updated = self.mirror_apply(id, update)?;
                self.mirror_push_event(event);
                Some(updated)
            }
        }
    }

    fn mirror_find(&self, id: &ApprovalId) -> Option<ApprovalRequest> {
        self.mirror
            .load::<ApprovalRequest>(keys::approvals_mirror())
            .into_iter()
            .find(|record| record.id == *id)
    }

    fn mirror_upsert(&self, record: &ApprovalRequest) {
        self.mirror
            .upsert_front(keys::approvals_mirror(), record, |candidate| {
                candidate.id == record.id
            });
    }

    /// Apply an update to the mirrored copy of a record, if present.
    fn mirror_apply(&self, id: &ApprovalId, update: &ApprovalUpdate) -> Option<ApprovalRequest> {
        let mut items = self.mirror.load::<ApprovalRequest>(keys::approvals_mirror());
        let record = items.iter_mut().find(|record| record.id == *id)?;
        update.apply_to(record);
        let updated = record.clone();
        self.mirror.replace(keys::approvals_mirror(), &items);
        Some(updated)
    }

    fn mirror_push_event(&self, event: &ApprovalEvent) {
        self.mirror
            .push_back(keys::approval_events_mirror(), event);
    }
}

/// Validate that a required string input is non-blank.
fn require(value: &str, field: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} is required")));
    }
    Ok(())
}

/// Trim an optional string; blanks become `None`.
fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// The typed patch to apply, when this decision calls for one: an
/// approval of an edit request carrying a diff with applicable fields.
fn pending_patch(current: &ApprovalRequest, decision: Decision) -> Option<AssetPatch> {
    use atrium_entity::approval::ApprovalAction;

    if decision != Decision::Approved || current.action != ApprovalAction::Edit {
        return None;
    }
    let value = current.patch.as_ref()?;
    let patch = AssetPatch::from_value(value);
    if patch.is_empty() {
        return None;
    }
    Some(patch)
}
