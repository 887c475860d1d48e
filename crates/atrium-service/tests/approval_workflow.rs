//! Workflow tests for the approval service.
//!
//! The service is exercised through fake ports: an in-memory store with
//! a failure switch (simulating remote outages), a recording notifier,
//! an in-memory asset table shared between the store's transactional
//! path and the fallback updater, and a fixed user directory.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use atrium_cache::{ListCache, MirrorStore};
use atrium_core::config::cache::CacheConfig;
use atrium_core::error::ErrorKind;
use atrium_core::result::AppResult;
use atrium_core::types::id::ApprovalId;
use atrium_entity::approval::{
    ApprovalAction, ApprovalFilter, ApprovalRequest, ApprovalStatus, ApprovalUpdate, Decision,
    SubmitApproval,
};
use atrium_entity::asset::AssetPatch;
use atrium_entity::event::{ApprovalEvent, EventKind};
use atrium_service::approval::{ApprovalService, FinalizeOutcome, StorePatch};
use atrium_service::asset::AssetUpdater;
use atrium_service::directory::{DirectoryUser, UserDirectory};
use atrium_service::notify::ApprovalNotifier;
use atrium_service::{ApprovalStore, RemoteError};

// ── Fakes ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
struct TestAsset {
    name: String,
    status: String,
}

type AssetTable = Arc<Mutex<HashMap<String, TestAsset>>>;

fn apply_to_asset(asset: &mut TestAsset, patch: &AssetPatch) {
    if let Some(name) = &patch.name {
        asset.name = name.clone();
    }
    if let Some(status) = &patch.status {
        asset.status = status.clone();
    }
}

#[derive(Default)]
struct StoreInner {
    approvals: Vec<ApprovalRequest>,
    events: Vec<ApprovalEvent>,
}

/// In-memory approval store with a failure switch.
struct FakeStore {
    inner: Mutex<StoreInner>,
    assets: AssetTable,
    failing: AtomicBool,
}

impl FakeStore {
    fn new(assets: AssetTable) -> Self {
        Self {
            inner: Mutex::new(StoreInner::default()),
            assets,
            failing: AtomicBool::new(false),
        }
    }

    fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), RemoteError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RemoteError::new("simulated outage"));
        }
        Ok(())
    }

    fn events_for(&self, approval_id: &ApprovalId) -> Vec<ApprovalEvent> {
        self.inner
            .lock()
            .unwrap()
            .events
            .iter()
            .filter(|e| e.approval_id == *approval_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ApprovalStore for FakeStore {
    async fn fetch(&self, id: &ApprovalId) -> Result<Option<ApprovalRequest>, RemoteError> {
        self.check()?;
        let inner = self.inner.lock().unwrap();
        Ok(inner.approvals.iter().find(|a| a.id == *id).cloned())
    }

    async fn list(&self, filter: &ApprovalFilter) -> Result<Vec<ApprovalRequest>, RemoteError> {
        self.check()?;
        let inner = self.inner.lock().unwrap();
        let mut items: Vec<ApprovalRequest> = inner
            .approvals
            .iter()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.requested_at.cmp(&a.requested_at));
        Ok(items)
    }

    async fn create(
        &self,
        record: &ApprovalRequest,
        event: &ApprovalEvent,
    ) -> Result<ApprovalRequest, RemoteError> {
        self.check()?;
        let mut inner = self.inner.lock().unwrap();
        inner.approvals.insert(0, record.clone());
        inner.events.push(event.clone());
        Ok(record.clone())
    }

    async fn update(
        &self,
        id: &ApprovalId,
        update: &ApprovalUpdate,
        event: Option<&ApprovalEvent>,
    ) -> Result<Option<ApprovalRequest>, RemoteError> {
        self.check()?;
        let mut inner = self.inner.lock().unwrap();
        let Some(record) = inner.approvals.iter_mut().find(|a| a.id == *id) else {
            return Ok(None);
        };
        update.apply_to(record);
        let updated = record.clone();
        if let Some(event) = event {
            inner.events.push(event.clone());
        }
        Ok(Some(updated))
    }

    async fn finalize(
        &self,
        id: &ApprovalId,
        update: &ApprovalUpdate,
        decision_event: &ApprovalEvent,
        patch: Option<StorePatch>,
    ) -> Result<Option<FinalizeOutcome>, RemoteError> {
        let Some(approval) = self.update(id, update, Some(decision_event)).await? else {
            return Ok(None);
        };

        let mut patch_applied = false;
        if let Some(application) = patch {
            let mut assets = self.assets.lock().unwrap();
            if let Some(asset) = assets.get_mut(&application.asset_id) {
                apply_to_asset(asset, &application.patch);
                patch_applied = true;
            }
            drop(assets);
            if patch_applied {
                self.inner
                    .lock()
                    .unwrap()
                    .events
                    .push(application.applied_event);
            }
        }

        Ok(Some(FinalizeOutcome {
            approval,
            patch_applied,
        }))
    }

    async fn list_events(
        &self,
        approval_id: &ApprovalId,
    ) -> Result<Vec<ApprovalEvent>, RemoteError> {
        self.check()?;
        let mut events = self.events_for(approval_id);
        events.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(events)
    }

    async fn append_event(&self, event: &ApprovalEvent) -> Result<ApprovalEvent, RemoteError> {
        self.check()?;
        self.inner.lock().unwrap().events.push(event.clone());
        Ok(event.clone())
    }
}

/// Fallback asset updater sharing the store's asset table.
struct FakeAssets {
    assets: AssetTable,
}

#[async_trait]
impl AssetUpdater for FakeAssets {
    async fn apply_patch(&self, asset_id: &str, patch: &AssetPatch) -> AppResult<bool> {
        let mut assets = self.assets.lock().unwrap();
        match assets.get_mut(asset_id) {
            Some(asset) => {
                apply_to_asset(asset, patch);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Sent {
    Submitted { approval: String, department: Option<String> },
    Forwarded { approval: String, manager: String },
    Decision { approval: String, recipient: String, decision: Decision },
}

/// Notifier that records every dispatch.
#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<Sent>>,
}

impl RecordingNotifier {
    fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ApprovalNotifier for RecordingNotifier {
    async fn manager_emails(&self, department: Option<&str>) -> AppResult<Vec<String>> {
        let _ = department;
        Ok(vec!["m1@x.com".to_string()])
    }

    async fn admin_emails(&self) -> AppResult<Vec<String>> {
        Ok(vec!["a1@x.com".to_string()])
    }

    async fn notify_submitted(&self, approval: &ApprovalRequest) -> AppResult<()> {
        self.sent.lock().unwrap().push(Sent::Submitted {
            approval: approval.id.to_string(),
            department: approval.department.clone(),
        });
        Ok(())
    }

    async fn notify_forwarded(
        &self,
        approval: &ApprovalRequest,
        manager: &str,
        _notes: Option<&str>,
    ) -> AppResult<()> {
        self.sent.lock().unwrap().push(Sent::Forwarded {
            approval: approval.id.to_string(),
            manager: manager.to_string(),
        });
        Ok(())
    }

    async fn notify_decision(
        &self,
        approval: &ApprovalRequest,
        _admin: &str,
        decision: Decision,
        _notes: Option<&str>,
    ) -> AppResult<()> {
        self.sent.lock().unwrap().push(Sent::Decision {
            approval: approval.id.to_string(),
            recipient: approval.requested_by.clone(),
            decision,
        });
        Ok(())
    }
}

/// Fixed directory.
struct FakeDirectory {
    users: Vec<DirectoryUser>,
}

#[async_trait]
impl UserDirectory for FakeDirectory {
    async fn department_of(&self, reference: &str) -> AppResult<Option<Option<String>>> {
        Ok(self
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(reference) || u.id == reference)
            .map(|u| u.department.clone()))
    }

    async fn display_name(&self, reference: &str) -> AppResult<Option<String>> {
        Ok(self
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(reference) || u.id == reference)
            .map(|u| u.name.clone()))
    }

    async fn snapshot(&self) -> AppResult<Vec<DirectoryUser>> {
        Ok(self.users.clone())
    }
}

// ── Harness ────────────────────────────────────────────────────

struct TestWorld {
    service: ApprovalService,
    store: Arc<FakeStore>,
    notifier: Arc<RecordingNotifier>,
    assets: AssetTable,
}

fn user(id: &str, email: &str, name: &str, department: Option<&str>) -> DirectoryUser {
    DirectoryUser {
        id: id.to_string(),
        email: email.to_string(),
        name: name.to_string(),
        department: department.map(str::to_string),
    }
}

fn world_with_users(users: Vec<DirectoryUser>) -> TestWorld {
    let assets: AssetTable = Arc::new(Mutex::new(HashMap::from([(
        "AST-1".to_string(),
        TestAsset {
            name: "Main generator".to_string(),
            status: "active".to_string(),
        },
    )])));

    let store = Arc::new(FakeStore::new(Arc::clone(&assets)));
    let notifier = Arc::new(RecordingNotifier::default());
    let service = ApprovalService::new(
        Arc::clone(&store) as Arc<dyn ApprovalStore>,
        Arc::new(MirrorStore::new()),
        Arc::new(ListCache::new(&CacheConfig::default())),
        Arc::clone(&notifier) as Arc<dyn ApprovalNotifier>,
        Arc::new(FakeAssets {
            assets: Arc::clone(&assets),
        }),
        Arc::new(FakeDirectory { users }),
    );

    TestWorld {
        service,
        store,
        notifier,
        assets,
    }
}

fn world() -> TestWorld {
    world_with_users(vec![
        user("u-1", "u1@x.com", "Uma", Some("Ops")),
        user("u-2", "u2@x.com", "Max", None),
    ])
}

fn submission(asset_id: &str, requested_by: &str) -> SubmitApproval {
    SubmitApproval {
        asset_id: asset_id.to_string(),
        action: ApprovalAction::Edit,
        requested_by: requested_by.to_string(),
        notes: None,
        patch: Some(json!({"status": "retired"})),
        department: None,
    }
}

fn asset_status(assets: &AssetTable, id: &str) -> String {
    assets.lock().unwrap().get(id).unwrap().status.clone()
}

// ── Tests ──────────────────────────────────────────────────────

#[tokio::test]
async fn submit_forces_pending_manager() {
    let w = world();
    let created = w.service.submit(submission("AST-1", "u1@x.com")).await.unwrap();

    assert_eq!(created.status, ApprovalStatus::PendingManager);
    assert!(created.reviewed_by.is_none());
    assert!(created.reviewed_at.is_none());
    assert!(created.id.as_str().starts_with("APR-"));
}

#[tokio::test]
async fn submit_resolves_department_from_profile() {
    let w = world();
    let created = w.service.submit(submission("AST-1", "u1@x.com")).await.unwrap();
    assert_eq!(created.department.as_deref(), Some("Ops"));
}

#[tokio::test]
async fn submit_prefers_explicit_department() {
    let w = world();
    let mut input = submission("AST-1", "u1@x.com");
    input.department = Some("  Facilities ".to_string());
    let created = w.service.submit(input).await.unwrap();
    assert_eq!(created.department.as_deref(), Some("Facilities"));
}

#[tokio::test]
async fn submit_rejects_blank_required_fields() {
    let w = world();
    let err = w
        .service
        .submit(submission("   ", "u1@x.com"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn forward_then_decide_walks_the_state_machine() {
    let w = world();
    let created = w.service.submit(submission("AST-1", "u1@x.com")).await.unwrap();

    let forwarded = w
        .service
        .forward_to_admin(&created.id, "m1@x.com", Some("looks right".to_string()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(forwarded.status, ApprovalStatus::PendingAdmin);
    assert_eq!(forwarded.reviewed_by.as_deref(), Some("m1@x.com"));
    assert!(forwarded.reviewed_at.is_some());

    let decided = w
        .service
        .decide_final(&created.id, Decision::Rejected, "a1@x.com", None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(decided.status, ApprovalStatus::Rejected);
    assert_eq!(decided.reviewed_by.as_deref(), Some("a1@x.com"));
}

#[tokio::test]
async fn forward_is_guarded_against_wrong_states() {
    let w = world();
    let created = w.service.submit(submission("AST-1", "u1@x.com")).await.unwrap();
    w.service
        .forward_to_admin(&created.id, "m1@x.com", None)
        .await
        .unwrap();

    let err = w
        .service
        .forward_to_admin(&created.id, "m1@x.com", None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn terminal_requests_cannot_be_redecided() {
    let w = world();
    let created = w.service.submit(submission("AST-1", "u1@x.com")).await.unwrap();
    w.service
        .admin_override_approve(&created.id, "a1@x.com", None)
        .await
        .unwrap();

    let err = w
        .service
        .decide_final(&created.id, Decision::Rejected, "a1@x.com", None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
}

#[tokio::test]
async fn override_skips_pending_admin_and_records_a_note() {
    let w = world();
    let created = w.service.submit(submission("AST-1", "u1@x.com")).await.unwrap();

    let approved = w
        .service
        .admin_override_approve(&created.id, "a1@x.com", None)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(approved.status, ApprovalStatus::Approved);
    assert!(approved
        .notes
        .as_deref()
        .unwrap()
        .contains("without level 1 approval"));
}

#[tokio::test]
async fn approved_edit_applies_patch_to_asset() {
    let w = world();
    let created = w.service.submit(submission("AST-1", "u1@x.com")).await.unwrap();
    w.service
        .forward_to_admin(&created.id, "m1@x.com", None)
        .await
        .unwrap();
    w.service
        .decide_final(&created.id, Decision::Approved, "a1@x.com", None)
        .await
        .unwrap();

    assert_eq!(asset_status(&w.assets, "AST-1"), "retired");

    let events = w.store.events_for(&created.id);
    assert!(events.iter().any(|e| e.kind == EventKind::Applied));
}

#[tokio::test]
async fn rejected_edit_leaves_asset_untouched() {
    let w = world();
    let created = w.service.submit(submission("AST-1", "u1@x.com")).await.unwrap();
    w.service
        .decide_final(&created.id, Decision::Rejected, "a1@x.com", None)
        .await
        .unwrap();
    assert_eq!(asset_status(&w.assets, "AST-1"), "active");
}

#[tokio::test]
async fn approved_non_edit_leaves_asset_untouched() {
    let w = world();
    let mut input = submission("AST-1", "u1@x.com");
    input.action = ApprovalAction::Decommission;
    let created = w.service.submit(input).await.unwrap();
    w.service
        .admin_override_approve(&created.id, "a1@x.com", None)
        .await
        .unwrap();
    assert_eq!(asset_status(&w.assets, "AST-1"), "active");
}

#[tokio::test]
async fn empty_patch_is_not_applied() {
    let w = world();
    let mut input = submission("AST-1", "u1@x.com");
    input.patch = Some(json!({}));
    let created = w.service.submit(input).await.unwrap();
    w.service
        .admin_override_approve(&created.id, "a1@x.com", None)
        .await
        .unwrap();

    assert_eq!(asset_status(&w.assets, "AST-1"), "active");
    let events = w.store.events_for(&created.id);
    assert!(!events.iter().any(|e| e.kind == EventKind::Applied));
}

#[tokio::test]
async fn list_filters_department_case_insensitively() {
    let w = world();
    let mut input = submission("AST-1", "u1@x.com");
    input.department = Some("Ops".to_string());
    w.service.submit(input).await.unwrap();
    w.service.submit(submission("AST-1", "u2@x.com")).await.unwrap();

    let filter = ApprovalFilter {
        department: Some("ops".to_string()),
        ..ApprovalFilter::default()
    };
    let listed = w.service.list(&filter).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].department.as_deref(), Some("Ops"));
}

#[tokio::test]
async fn offline_submit_is_readable_from_the_mirror() {
    let w = world();
    w.store.set_failing(true);

    let created = w.service.submit(submission("AST-1", "u1@x.com")).await.unwrap();
    assert_eq!(created.status, ApprovalStatus::PendingManager);

    let listed = w.service.list(&ApprovalFilter::default()).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, created.id);

    let fetched = w.service.get(&created.id).await.unwrap().unwrap();
    assert_eq!(fetched.id, created.id);

    // Nothing reached the remote store.
    w.store.set_failing(false);
    assert!(w.store.fetch(&created.id).await.unwrap().is_none());
}

#[tokio::test]
async fn offline_forward_updates_the_mirror_copy() {
    let w = world();
    let created = w.service.submit(submission("AST-1", "u1@x.com")).await.unwrap();

    w.store.set_failing(true);
    let forwarded = w
        .service
        .forward_to_admin(&created.id, "m1@x.com", None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(forwarded.status, ApprovalStatus::PendingAdmin);

    let listed = w.service.list(&ApprovalFilter::default()).await.unwrap();
    assert_eq!(listed[0].status, ApprovalStatus::PendingAdmin);
}

#[tokio::test]
async fn missing_ids_yield_none_not_errors() {
    let w = world();
    let missing = ApprovalId::from_string("APR-000000");
    assert!(w
        .service
        .forward_to_admin(&missing, "m1@x.com", None)
        .await
        .unwrap()
        .is_none());
    assert!(w
        .service
        .decide_final(&missing, Decision::Approved, "a1@x.com", None)
        .await
        .unwrap()
        .is_none());
    assert!(w
        .service
        .update_patch(&missing, "m1@x.com", json!({"status": "retired"}))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn update_patch_replaces_diff_without_touching_status() {
    let w = world();
    let created = w.service.submit(submission("AST-1", "u1@x.com")).await.unwrap();

    let updated = w
        .service
        .update_patch(&created.id, "m1@x.com", json!({"status": "maintenance"}))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.status, ApprovalStatus::PendingManager);
    assert_eq!(updated.patch, Some(json!({"status": "maintenance"})));

    let events = w.store.events_for(&created.id);
    assert!(events.iter().any(|e| e.kind == EventKind::PatchUpdated));
}

#[tokio::test]
async fn comments_carry_the_field_prefix() {
    let w = world();
    let created = w.service.submit(submission("AST-1", "u1@x.com")).await.unwrap();

    w.service
        .add_comment(&created.id, "m1@x.com", "status", "retire instead of dispose")
        .await
        .unwrap();

    let events = w.service.list_events(&created.id).await.unwrap();
    let comment = events.iter().find(|e| e.kind == EventKind::Comment).unwrap();
    assert_eq!(
        comment.message.as_deref(),
        Some("status: retire instead of dispose")
    );
}

#[tokio::test]
async fn notifications_follow_each_transition() {
    let w = world();
    let created = w.service.submit(submission("AST-1", "u1@x.com")).await.unwrap();
    w.service
        .forward_to_admin(&created.id, "m1@x.com", None)
        .await
        .unwrap();
    w.service
        .decide_final(&created.id, Decision::Approved, "a1@x.com", None)
        .await
        .unwrap();

    let sent = w.notifier.sent();
    assert_eq!(
        sent,
        vec![
            Sent::Submitted {
                approval: created.id.to_string(),
                department: Some("Ops".to_string()),
            },
            Sent::Forwarded {
                approval: created.id.to_string(),
                manager: "m1@x.com".to_string(),
            },
            Sent::Decision {
                approval: created.id.to_string(),
                recipient: "u1@x.com".to_string(),
                decision: Decision::Approved,
            },
        ]
    );
}

#[tokio::test]
async fn resync_updates_only_drifted_rows() {
    let w = world_with_users(vec![
        user("u-1", "u1@x.com", "Uma", Some("Facilities")),
        user("u-2", "u2@x.com", "Max", Some("IT")),
    ]);

    // u1's approval snapshot says Ops; profile now says Facilities.
    let mut drifted = submission("AST-1", "u1@x.com");
    drifted.department = Some("Ops".to_string());
    let drifted = w.service.submit(drifted).await.unwrap();

    // u2's snapshot already matches the profile.
    let mut current = submission("AST-1", "u2@x.com");
    current.department = Some("IT".to_string());
    w.service.submit(current).await.unwrap();

    // Unknown submitter: left untouched.
    w.service.submit(submission("AST-1", "ghost@x.com")).await.unwrap();

    let report = w.service.resync_departments().await.unwrap();
    assert_eq!(report.updated, 1);
    assert_eq!(report.total, 3);
    assert_eq!(report.errors, 0);

    let healed = w.service.get(&drifted.id).await.unwrap().unwrap();
    assert_eq!(healed.department.as_deref(), Some("Facilities"));
}

#[tokio::test]
async fn end_to_end_edit_scenario() {
    let w = world();

    let created = w
        .service
        .submit(SubmitApproval {
            asset_id: "AST-1".to_string(),
            action: ApprovalAction::Edit,
            requested_by: "u1@x.com".to_string(),
            notes: None,
            patch: Some(json!({"status": "retired"})),
            department: None,
        })
        .await
        .unwrap();
    assert_eq!(created.status, ApprovalStatus::PendingManager);

    let forwarded = w
        .service
        .forward_to_admin(&created.id, "m1@x.com", None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(forwarded.status, ApprovalStatus::PendingAdmin);

    let approved = w
        .service
        .decide_final(&created.id, Decision::Approved, "a1@x.com", None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(approved.status, ApprovalStatus::Approved);

    assert_eq!(asset_status(&w.assets, "AST-1"), "retired");
}
