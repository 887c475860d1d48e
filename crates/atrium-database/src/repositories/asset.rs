//! Asset repository implementation.

use sqlx::{PgConnection, PgPool};

use atrium_core::error::{AppError, ErrorKind};
use atrium_core::result::AppResult;
use atrium_entity::asset::{Asset, AssetPatch};

/// Repository for asset rows.
///
/// Only the operations the approval workflow needs: lookup and the typed
/// patch application performed on final approval of an edit request.
#[derive(Debug, Clone)]
pub struct AssetRepository {
    pool: PgPool,
}

impl AssetRepository {
    /// Create a new asset repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an asset by its opaque identifier.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<Asset>> {
        sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find asset by id", e)
            })
    }

    /// Apply a typed field diff to an asset. Returns whether a row was
    /// actually rewritten (a dangling asset id affects nothing).
    pub async fn apply_patch(&self, id: &str, patch: &AssetPatch) -> AppResult<bool> {
        Self::apply_patch_on(
            &mut *self.pool.acquire().await.map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to acquire connection", e)
            })?,
            id,
            patch,
        )
        .await
    }

    /// Apply a typed field diff on an existing connection or transaction.
    ///
    /// Every column named here is the complete set a diff may touch;
    /// unknown keys were already dropped during [`AssetPatch`] parsing.
    pub async fn apply_patch_on(
        conn: &mut PgConnection,
        id: &str,
        patch: &AssetPatch,
    ) -> AppResult<bool> {
        if patch.is_empty() {
            return Ok(false);
        }

        let result = sqlx::query(
            "UPDATE assets SET name = COALESCE($2, name), \
                               status = COALESCE($3, status), \
                               location = COALESCE($4, location), \
                               department = COALESCE($5, department), \
                               assignee = COALESCE($6, assignee), \
                               updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.status)
        .bind(&patch.location)
        .bind(&patch.department)
        .bind(&patch.assignee)
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to apply asset patch", e))?;

        Ok(result.rows_affected() > 0)
    }
}
