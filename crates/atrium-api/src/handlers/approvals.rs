//! Approval handlers: the storage surface plus the workflow routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::Query;
use chrono::Utc;
use validator::Validate;

use atrium_core::error::AppError;
use atrium_core::types::id::ApprovalId;
use atrium_entity::approval::{
    ApprovalRequest, ApprovalStatus, ApprovalUpdate, SubmitApproval,
};
use atrium_service::approval::ResyncReport;

use crate::dto::request::{
    AddCommentRequest, CreateApprovalRequest, DecideApprovalRequest, ForwardApprovalRequest,
    ListApprovalsParams, OverrideApprovalRequest, SubmitApprovalRequest, UpdatePatchRequest,
};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// GET /api/approvals?status&department&requestedBy&assetId
pub async fn list_approvals(
    State(state): State<AppState>,
    Query(params): Query<ListApprovalsParams>,
) -> ApiResult<Json<Vec<ApprovalRequest>>> {
    let approvals = state
        .approval_service
        .list(&params.into_filter())
        .await
        .map_err(ApiError)?;
    Ok(Json(approvals))
}

/// GET /api/approvals/{id}
pub async fn get_approval(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApprovalRequest>> {
    let id = ApprovalId::from(id);
    let approval = state
        .approval_service
        .get(&id)
        .await
        .map_err(ApiError)?
        .ok_or_else(|| ApiError(AppError::not_found(format!("Approval {id} not found"))))?;
    Ok(Json(approval))
}

/// POST /api/approvals — plain storage create. The server fills in a
/// fresh id, `pending_manager`, and the current time when omitted.
pub async fn create_approval(
    State(state): State<AppState>,
    Json(payload): Json<CreateApprovalRequest>,
) -> ApiResult<(StatusCode, Json<ApprovalRequest>)> {
    payload
        .validate()
        .map_err(|e| ApiError(AppError::validation(e.to_string())))?;

    let record = ApprovalRequest {
        id: payload
            .id
            .map(ApprovalId::from)
            .unwrap_or_else(ApprovalId::generate),
        asset_id: payload.asset_id,
        action: payload.action,
        status: payload.status.unwrap_or(ApprovalStatus::PendingManager),
        requested_by: payload.requested_by,
        requested_at: payload.requested_at.unwrap_or_else(Utc::now),
        reviewed_by: payload.reviewed_by,
        reviewed_at: payload.reviewed_at,
        notes: payload.notes,
        patch: payload.patch,
        department: payload.department,
    };

    let created = state.approval_repo.create(&record).await.map_err(ApiError)?;
    state.approval_service.invalidate_lists().await;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/approvals/{id} — typed partial update. The body enumerates
/// exactly the mutable fields; anything else is rejected by shape.
pub async fn update_approval(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<ApprovalUpdate>,
) -> ApiResult<Json<ApprovalRequest>> {
    let id = ApprovalId::from(id);
    let updated = state
        .approval_service
        .apply_update(&id, &update)
        .await
        .map_err(ApiError)?
        .ok_or_else(|| ApiError(AppError::not_found(format!("Approval {id} not found"))))?;
    Ok(Json(updated))
}

/// POST /api/approvals/submit — workflow submission.
pub async fn submit_approval(
    State(state): State<AppState>,
    Json(payload): Json<SubmitApprovalRequest>,
) -> ApiResult<(StatusCode, Json<ApprovalRequest>)> {
    payload
        .validate()
        .map_err(|e| ApiError(AppError::validation(e.to_string())))?;

    let created = state
        .approval_service
        .submit(SubmitApproval {
            asset_id: payload.asset_id,
            action: payload.action,
            requested_by: payload.requested_by,
            notes: payload.notes,
            patch: payload.patch,
            department: payload.department,
        })
        .await
        .map_err(ApiError)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// POST /api/approvals/{id}/forward
pub async fn forward_approval(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ForwardApprovalRequest>,
) -> ApiResult<Json<ApprovalRequest>> {
    payload
        .validate()
        .map_err(|e| ApiError(AppError::validation(e.to_string())))?;

    let id = ApprovalId::from(id);
    let updated = state
        .approval_service
        .forward_to_admin(&id, &payload.manager, payload.notes)
        .await
        .map_err(ApiError)?
        .ok_or_else(|| ApiError(AppError::not_found(format!("Approval {id} not found"))))?;
    Ok(Json(updated))
}

/// POST /api/approvals/{id}/decision
pub async fn decide_approval(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<DecideApprovalRequest>,
) -> ApiResult<Json<ApprovalRequest>> {
    payload
        .validate()
        .map_err(|e| ApiError(AppError::validation(e.to_string())))?;

    let id = ApprovalId::from(id);
    let updated = state
        .approval_service
        .decide_final(&id, payload.decision, &payload.admin, payload.notes)
        .await
        .map_err(ApiError)?
        .ok_or_else(|| ApiError(AppError::not_found(format!("Approval {id} not found"))))?;
    Ok(Json(updated))
}

/// POST /api/approvals/{id}/override
pub async fn override_approval(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<OverrideApprovalRequest>,
) -> ApiResult<Json<ApprovalRequest>> {
    payload
        .validate()
        .map_err(|e| ApiError(AppError::validation(e.to_string())))?;

    let id = ApprovalId::from(id);
    let updated = state
        .approval_service
        .admin_override_approve(&id, &payload.admin, payload.notes)
        .await
        .map_err(ApiError)?
        .ok_or_else(|| ApiError(AppError::not_found(format!("Approval {id} not found"))))?;
    Ok(Json(updated))
}

/// PUT /api/approvals/{id}/patch
pub async fn update_approval_patch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdatePatchRequest>,
) -> ApiResult<Json<ApprovalRequest>> {
    payload
        .validate()
        .map_err(|e| ApiError(AppError::validation(e.to_string())))?;

    let id = ApprovalId::from(id);
    let updated = state
        .approval_service
        .update_patch(&id, &payload.manager, payload.patch)
        .await
        .map_err(ApiError)?
        .ok_or_else(|| ApiError(AppError::not_found(format!("Approval {id} not found"))))?;
    Ok(Json(updated))
}

/// POST /api/approvals/{id}/comments
pub async fn add_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<AddCommentRequest>,
) -> ApiResult<(StatusCode, Json<atrium_entity::event::ApprovalEvent>)> {
    payload
        .validate()
        .map_err(|e| ApiError(AppError::validation(e.to_string())))?;

    let id = ApprovalId::from(id);
    let event = state
        .approval_service
        .add_comment(&id, &payload.author, &payload.field, &payload.message)
        .await
        .map_err(ApiError)?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// POST /api/approvals/resync-departments
pub async fn resync_departments(
    State(state): State<AppState>,
) -> ApiResult<Json<ResyncReport>> {
    let report = state
        .approval_service
        .resync_departments()
        .await
        .map_err(ApiError)?;
    Ok(Json(report))
}
