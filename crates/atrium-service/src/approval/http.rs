//! REST-consuming approval store.
//!
//! Implements the [`ApprovalStore`] port against the plain JSON REST
//! surface (`/approvals`, `/approval-events`, `/assets`), for
//! deployments where the workflow runs client-side against a remote
//! backend. Unlike the PostgreSQL store, this one cannot batch the
//! approval row and its audit event into a transaction: writes are
//! sequential and a partial failure leaves an approval updated without
//! its matching event. That weaker consistency is inherent to the
//! surface and accepted for client-side deployments.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use atrium_core::types::id::ApprovalId;
use atrium_entity::approval::{ApprovalFilter, ApprovalRequest, ApprovalUpdate};
use atrium_entity::event::ApprovalEvent;

use super::store::{ApprovalStore, FinalizeOutcome, RemoteError, StorePatch};

/// Approval store that consumes a remote REST API.
#[derive(Debug, Clone)]
pub struct HttpApprovalStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApprovalStore {
    /// Create a store targeting `base_url` (e.g. `http://host:8080/api`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn expect_json<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, RemoteError> {
        let response = response.error_for_status()?;
        Ok(response.json::<T>().await?)
    }

    /// Like [`Self::expect_json`], but a 404 maps to `Ok(None)`.
    async fn maybe_json<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<Option<T>, RemoteError> {
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::expect_json(response).await.map(Some)
    }

    fn filter_query(filter: &ApprovalFilter) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(status) = filter.status {
            query.push(("status", status.as_str().to_string()));
        }
        if let Some(department) = &filter.department {
            query.push(("department", department.clone()));
        }
        if let Some(requested_by) = &filter.requested_by {
            query.push(("requestedBy", requested_by.clone()));
        }
        if let Some(asset_ids) = &filter.asset_ids {
            for id in asset_ids {
                query.push(("assetId", id.clone()));
            }
        }
        query
    }
}

#[async_trait]
impl ApprovalStore for HttpApprovalStore {
    async fn fetch(&self, id: &ApprovalId) -> Result<Option<ApprovalRequest>, RemoteError> {
        let response = self
            .client
            .get(self.url(&format!("/approvals/{id}")))
            .send()
            .await?;
        Self::maybe_json(response).await
    }

    async fn list(&self, filter: &ApprovalFilter) -> Result<Vec<ApprovalRequest>, RemoteError> {
        let response = self
            .client
            .get(self.url("/approvals"))
            .query(&Self::filter_query(filter))
            .send()
            .await?;
        Self::expect_json(response).await
    }

    async fn create(
        &self,
        record: &ApprovalRequest,
        event: &ApprovalEvent,
    ) -> Result<ApprovalRequest, RemoteError> {
        let response = self
            .client
            .post(self.url("/approvals"))
            .json(record)
            .send()
            .await?;
        let created: ApprovalRequest = Self::expect_json(response).await?;

        // Event append rides behind the row write; see module docs.
        self.append_event(event).await?;
        Ok(created)
    }

    async fn update(
        &self,
        id: &ApprovalId,
        update: &ApprovalUpdate,
        event: Option<&ApprovalEvent>,
    ) -> Result<Option<ApprovalRequest>, RemoteError> {
        let response = self
            .client
            .put(self.url(&format!("/approvals/{id}")))
            .json(update)
            .send()
            .await?;
        let Some(updated) = Self::maybe_json::<ApprovalRequest>(response).await? else {
            return Ok(None);
        };

        if let Some(event) = event {
            self.append_event(event).await?;
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
            let response = self
                .client
                .put(self.url(&format!("/assets/{}", application.asset_id)))
                .json(&application.patch)
                .send()
                .await?;
            if response.status() != StatusCode::NOT_FOUND {
                response.error_for_status()?;
                patch_applied = true;
                self.append_event(&application.applied_event).await?;
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
        let response = self
            .client
            .get(self.url("/approval-events"))
            .query(&[("approvalId", approval_id.as_str())])
            .send()
            .await?;
        Self::expect_json(response).await
    }

    async fn append_event(&self, event: &ApprovalEvent) -> Result<ApprovalEvent, RemoteError> {
        let response = self
            .client
            .post(self.url("/approval-events"))
            .json(event)
            .send()
            .await?;
        Self::expect_json(response).await
    }
}
