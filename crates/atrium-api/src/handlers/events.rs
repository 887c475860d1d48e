//! Approval event handlers.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use validator::Validate;

use atrium_core::error::AppError;
use atrium_core::types::id::{ApprovalId, EventId};
use atrium_entity::event::ApprovalEvent;

use crate::dto::request::{AppendEventRequest, ListEventsParams};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// GET /api/approval-events?approvalId — the audit trail, oldest first.
pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<ListEventsParams>,
) -> ApiResult<Json<Vec<ApprovalEvent>>> {
    let approval_id = ApprovalId::from(params.approval_id);
    let events = state
        .approval_service
        .list_events(&approval_id)
        .await
        .map_err(ApiError)?;
    Ok(Json(events))
}

/// POST /api/approval-events — append to the trail.
pub async fn append_event(
    State(state): State<AppState>,
    Json(payload): Json<AppendEventRequest>,
) -> ApiResult<(StatusCode, Json<ApprovalEvent>)> {
    payload
        .validate()
        .map_err(|e| ApiError(AppError::validation(e.to_string())))?;

    let event = ApprovalEvent {
        id: payload
            .id
            .map(EventId::from)
            .unwrap_or_else(EventId::generate),
        approval_id: ApprovalId::from(payload.approval_id),
        kind: payload.kind,
        author: payload.author,
        message: payload.message,
        created_at: payload.created_at.unwrap_or_else(Utc::now),
    };

    let stored = state
        .approval_service
        .append_event(&event)
        .await
        .map_err(ApiError)?;
    Ok((StatusCode::CREATED, Json(stored)))
}
