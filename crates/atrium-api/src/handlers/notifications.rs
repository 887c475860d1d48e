//! In-app notification handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use uuid::Uuid;

use atrium_core::error::AppError;
use atrium_entity::notification::Notification;

use crate::dto::request::ListNotificationsParams;
use crate::dto::response::{CountResponse, MessageResponse};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// GET /api/notifications?email&limit — newest first.
pub async fn list_notifications(
    State(state): State<AppState>,
    Query(params): Query<ListNotificationsParams>,
) -> ApiResult<Json<Vec<Notification>>> {
    let notifications = state
        .notification_repo
        .find_by_email(&params.email, params.limit)
        .await
        .map_err(ApiError)?;
    Ok(Json(notifications))
}

/// GET /api/notifications/unread-count?email
pub async fn unread_count(
    State(state): State<AppState>,
    Query(params): Query<ListNotificationsParams>,
) -> ApiResult<Json<CountResponse>> {
    let count = state
        .notification_repo
        .count_unread(&params.email)
        .await
        .map_err(ApiError)?;
    Ok(Json(CountResponse { count }))
}

/// POST /api/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let updated = state
        .notification_repo
        .mark_read(id)
        .await
        .map_err(ApiError)?;
    if !updated {
        return Err(ApiError(AppError::not_found(format!(
            "Notification {id} not found"
        ))));
    }
    Ok(Json(MessageResponse {
        message: "read".to_string(),
    }))
}
