//! PostgreSQL-backed approval store.
//!
//! Adapts the repository layer to the [`ApprovalStore`] port. All
//! multi-row writes (row + event, decision + patch) are transactional
//! here — the approval's terminal state and its side effects commit or
//! roll back together.

use std::sync::Arc;

use async_trait::async_trait;

use atrium_core::types::id::ApprovalId;
use atrium_database::repositories::approval::{ApprovalRepository, PatchApplication};
use atrium_database::repositories::event::ApprovalEventRepository;
use atrium_entity::approval::{ApprovalFilter, ApprovalRequest, ApprovalUpdate};
use atrium_entity::event::ApprovalEvent;

use super::store::{ApprovalStore, FinalizeOutcome, RemoteError, StorePatch};

/// Approval store backed by the local PostgreSQL repositories.
#[derive(Debug, Clone)]
pub struct PgApprovalStore {
    approvals: Arc<ApprovalRepository>,
    events: Arc<ApprovalEventRepository>,
}

impl PgApprovalStore {
    /// Create a new PostgreSQL-backed store.
    pub fn new(approvals: Arc<ApprovalRepository>, events: Arc<ApprovalEventRepository>) -> Self {
        Self { approvals, events }
    }
}

#[async_trait]
impl ApprovalStore for PgApprovalStore {
    async fn fetch(&self, id: &ApprovalId) -> Result<Option<ApprovalRequest>, RemoteError> {
        Ok(self.approvals.find_by_id(id).await?)
    }

    async fn list(&self, filter: &ApprovalFilter) -> Result<Vec<ApprovalRequest>, RemoteError> {
        Ok(self.approvals.find_filtered(filter).await?)
    }

    async fn create(
        &self,
        record: &ApprovalRequest,
        event: &ApprovalEvent,
    ) -> Result<ApprovalRequest, RemoteError> {
        Ok(self.approvals.create_with_event(record, event).await?)
    }

    async fn update(
        &self,
        id: &ApprovalId,
        update: &ApprovalUpdate,
        event: Option<&ApprovalEvent>,
    ) -> Result<Option<ApprovalRequest>, RemoteError> {
        let updated = match event {
            Some(event) => self.approvals.update_with_event(id, update, event).await?,
            None => self.approvals.update(id, update).await?,
        };
        Ok(updated)
    }

    async fn finalize(
        &self,
        id: &ApprovalId,
        update: &ApprovalUpdate,
        decision_event: &ApprovalEvent,
        patch: Option<StorePatch>,
    ) -> Result<Option<FinalizeOutcome>, RemoteError> {
        let application = patch.as_ref().map(|p| PatchApplication {
            asset_id: &p.asset_id,
            patch: &p.patch,
            applied_event: p.applied_event.clone(),
        });

        let outcome = self
            .approvals
            .finalize(id, update, decision_event, application)
            .await?;

        Ok(outcome.map(|(approval, patch_applied)| FinalizeOutcome {
            approval,
            patch_applied,
        }))
    }

    async fn list_events(
        &self,
        approval_id: &ApprovalId,
    ) -> Result<Vec<ApprovalEvent>, RemoteError> {
        Ok(self.events.find_by_approval(approval_id).await?)
    }

    async fn append_event(&self, event: &ApprovalEvent) -> Result<ApprovalEvent, RemoteError> {
        Ok(self.events.insert(event).await?)
    }
}
