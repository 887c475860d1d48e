//! Storage port for approval persistence.
//!
//! The workflow service persists through this trait rather than a
//! concrete repository so that remote unavailability is an explicit,
//! typed outcome ([`RemoteError`]) and the degrade-to-mirror policy
//! lives in one place — the service — instead of being scattered
//! through every operation. Tests exercise the policy by injecting a
//! failing store; no network mocking is involved.

use async_trait::async_trait;
use thiserror::Error;

use atrium_core::error::AppError;
use atrium_core::types::id::ApprovalId;
use atrium_entity::approval::{ApprovalFilter, ApprovalRequest, ApprovalUpdate};
use atrium_entity::asset::AssetPatch;
use atrium_entity::event::ApprovalEvent;

/// The remote store could not complete an operation.
///
/// Covers every failure class the mirror recovers from: connection
/// refusal, non-2xx responses, unparseable bodies, query errors.
/// A missing row is *not* an error — lookups return `Ok(None)`.
#[derive(Debug, Error)]
#[error("remote store unavailable: {message}")]
pub struct RemoteError {
    /// What failed.
    pub message: String,
    /// Underlying cause, when one exists.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl RemoteError {
    /// Create a remote error without a cause.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create a remote error wrapping its cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl From<AppError> for RemoteError {
    fn from(err: AppError) -> Self {
        Self {
            message: err.message.clone(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        Self {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

/// Asset patch application requested as part of a final decision.
#[derive(Debug, Clone)]
pub struct StorePatch {
    /// The asset to rewrite.
    pub asset_id: String,
    /// The typed field diff.
    pub patch: AssetPatch,
    /// Event to append when the patch actually lands.
    pub applied_event: ApprovalEvent,
}

/// Result of a final decision write.
#[derive(Debug, Clone)]
pub struct FinalizeOutcome {
    /// The approval after the status flip.
    pub approval: ApprovalRequest,
    /// Whether the asset patch was applied.
    pub patch_applied: bool,
}

/// Remote persistence for approvals and their audit events.
#[async_trait]
pub trait ApprovalStore: Send + Sync {
    /// Fetch one approval. `Ok(None)` when the id does not exist.
    async fn fetch(&self, id: &ApprovalId) -> Result<Option<ApprovalRequest>, RemoteError>;

    /// List approvals matching the filter, newest submissions first.
    async fn list(&self, filter: &ApprovalFilter) -> Result<Vec<ApprovalRequest>, RemoteError>;

    /// Persist a new approval together with its submission event.
    ///
    /// Stores that own both tables write them atomically; stores that
    /// consume a plain REST surface write them sequentially.
    async fn create(
        &self,
        record: &ApprovalRequest,
        event: &ApprovalEvent,
    ) -> Result<ApprovalRequest, RemoteError>;

    /// Apply a typed partial update, optionally appending an audit
    /// event. `Ok(None)` when the id does not exist.
    async fn update(
        &self,
        id: &ApprovalId,
        update: &ApprovalUpdate,
        event: Option<&ApprovalEvent>,
    ) -> Result<Option<ApprovalRequest>, RemoteError>;

    /// Record a final decision: status flip, decision event, and an
    /// optional asset patch application.
    async fn finalize(
        &self,
        id: &ApprovalId,
        update: &ApprovalUpdate,
        decision_event: &ApprovalEvent,
        patch: Option<StorePatch>,
    ) -> Result<Option<FinalizeOutcome>, RemoteError>;

    /// List the audit events of one approval, oldest first.
    async fn list_events(&self, approval_id: &ApprovalId)
        -> Result<Vec<ApprovalEvent>, RemoteError>;

    /// Append a standalone audit event (comments).
    async fn append_event(&self, event: &ApprovalEvent) -> Result<ApprovalEvent, RemoteError>;
}
