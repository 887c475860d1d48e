//! Asset collaborator handlers.
//!
//! Only the slice the approval workflow consumes: lookup and the typed
//! patch application endpoint used when a remote deployment applies an
//! approved edit.

use axum::extract::{Path, State};
use axum::Json;

use atrium_core::error::AppError;
use atrium_entity::asset::{Asset, AssetPatch};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// GET /api/assets/{id}
pub async fn get_asset(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Asset>> {
    let asset = state
        .asset_repo
        .find_by_id(&id)
        .await
        .map_err(ApiError)?
        .ok_or_else(|| ApiError(AppError::not_found(format!("Asset {id} not found"))))?;
    Ok(Json(asset))
}

/// PUT /api/assets/{id} — apply a typed field diff.
pub async fn update_asset(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<AssetPatch>,
) -> ApiResult<Json<Asset>> {
    if !patch.is_empty() {
        let applied = state
            .asset_repo
            .apply_patch(&id, &patch)
            .await
            .map_err(ApiError)?;
        if !applied {
            return Err(ApiError(AppError::not_found(format!(
                "Asset {id} not found"
            ))));
        }
    }

    let asset = state
        .asset_repo
        .find_by_id(&id)
        .await
        .map_err(ApiError)?
        .ok_or_else(|| ApiError(AppError::not_found(format!("Asset {id} not found"))))?;
    Ok(Json(asset))
}
