//! Approval repository implementation.
//!
//! Besides single-row CRUD this repository owns the workflow's
//! transactional writes: a status transition, its audit event, and (on
//! final approval of an edit) the asset patch application commit or roll
//! back together.

use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use atrium_core::error::{AppError, ErrorKind};
use atrium_core::result::AppResult;
use atrium_core::types::id::ApprovalId;
use atrium_entity::approval::{ApprovalFilter, ApprovalRequest, ApprovalUpdate};
use atrium_entity::asset::AssetPatch;
use atrium_entity::event::ApprovalEvent;

use super::asset::AssetRepository;
use super::event::ApprovalEventRepository;

/// Asset patch application bundled into a finalize transaction.
#[derive(Debug)]
pub struct PatchApplication<'a> {
    /// The asset to rewrite.
    pub asset_id: &'a str,
    /// The typed field diff.
    pub patch: &'a AssetPatch,
    /// Event appended when the patch actually lands.
    pub applied_event: ApprovalEvent,
}

/// Repository for approval request rows.
#[derive(Debug, Clone)]
pub struct ApprovalRepository {
    pool: PgPool,
}

impl ApprovalRepository {
    /// Create a new approval repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an approval by primary key.
    pub async fn find_by_id(&self, id: &ApprovalId) -> AppResult<Option<ApprovalRequest>> {
        sqlx::query_as::<_, ApprovalRequest>("SELECT * FROM approvals WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find approval by id", e)
            })
    }

    /// List approvals matching the filter, newest submissions first.
    ///
    /// Department, requester, and asset-id comparisons are
    /// case-insensitive, mirroring [`ApprovalFilter::matches`].
    pub async fn find_filtered(&self, filter: &ApprovalFilter) -> AppResult<Vec<ApprovalRequest>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM approvals WHERE 1=1");

        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(department) = &filter.department {
            qb.push(" AND LOWER(department) = LOWER(")
                .push_bind(department.clone())
                .push(")");
        }
        if let Some(requested_by) = &filter.requested_by {
            qb.push(" AND LOWER(requested_by) = LOWER(")
                .push_bind(requested_by.clone())
                .push(")");
        }
        if let Some(asset_ids) = &filter.asset_ids {
            if !asset_ids.is_empty() {
                let lowered: Vec<String> =
                    asset_ids.iter().map(|id| id.to_lowercase()).collect();
                qb.push(" AND LOWER(asset_id) = ANY(")
                    .push_bind(lowered)
                    .push(")");
            }
        }

        qb.push(" ORDER BY requested_at DESC");

        qb.build_query_as::<ApprovalRequest>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list approvals", e))
    }

    /// Insert a new approval row.
    pub async fn create(&self, record: &ApprovalRequest) -> AppResult<ApprovalRequest> {
        Self::create_on(&mut *self.pool.acquire().await.map_err(acquire_err)?, record).await
    }

    /// Insert a new approval row together with its submission event, in
    /// one transaction.
    pub async fn create_with_event(
        &self,
        record: &ApprovalRequest,
        event: &ApprovalEvent,
    ) -> AppResult<ApprovalRequest> {
        let mut tx = self.pool.begin().await.map_err(begin_err)?;
        let created = Self::create_on(&mut *tx, record).await?;
        ApprovalEventRepository::insert_on(&mut *tx, event).await?;
        tx.commit().await.map_err(commit_err)?;
        Ok(created)
    }

    /// Apply a typed partial update to an approval row.
    ///
    /// Returns the updated row, or `None` when the id does not exist.
    pub async fn update(
        &self,
        id: &ApprovalId,
        update: &ApprovalUpdate,
    ) -> AppResult<Option<ApprovalRequest>> {
        Self::update_on(&mut *self.pool.acquire().await.map_err(acquire_err)?, id, update).await
    }

    /// Apply a typed partial update plus its audit event, in one
    /// transaction. Nothing is written when the id does not exist.
    pub async fn update_with_event(
        &self,
        id: &ApprovalId,
        update: &ApprovalUpdate,
        event: &ApprovalEvent,
    ) -> AppResult<Option<ApprovalRequest>> {
        let mut tx = self.pool.begin().await.map_err(begin_err)?;
        let Some(updated) = Self::update_on(&mut *tx, id, update).await? else {
            return Ok(None);
        };
        ApprovalEventRepository::insert_on(&mut *tx, event).await?;
        tx.commit().await.map_err(commit_err)?;
        Ok(Some(updated))
    }

    /// Record a final decision: status flip, decision event, and (for an
    /// approved edit) the asset patch — all in one transaction, so the
    /// terminal state and its side effects cannot diverge.
    ///
    /// Returns the updated row and whether the patch landed. A patch
    /// aimed at a nonexistent asset affects nothing and is reported as
    /// not applied; the decision itself still commits (dangling asset
    /// references are accepted at submission time).
    pub async fn finalize(
        &self,
        id: &ApprovalId,
        update: &ApprovalUpdate,
        decision_event: &ApprovalEvent,
        patch: Option<PatchApplication<'_>>,
    ) -> AppResult<Option<(ApprovalRequest, bool)>> {
        let mut tx = self.pool.begin().await.map_err(begin_err)?;
        let Some(updated) = Self::update_on(&mut *tx, id, update).await? else {
            return Ok(None);
        };
        ApprovalEventRepository::insert_on(&mut *tx, decision_event).await?;

        let mut applied = false;
        if let Some(application) = patch {
            applied =
                AssetRepository::apply_patch_on(&mut *tx, application.asset_id, application.patch)
                    .await?;
            if applied {
                ApprovalEventRepository::insert_on(&mut *tx, &application.applied_event).await?;
            }
        }

        tx.commit().await.map_err(commit_err)?;
        Ok(Some((updated, applied)))
    }

    /// Count all approval rows.
    pub async fn count(&self) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM approvals")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count approvals", e)
            })?;
        Ok(count as u64)
    }

    async fn create_on(
        conn: &mut PgConnection,
        record: &ApprovalRequest,
    ) -> AppResult<ApprovalRequest> {
        sqlx::query_as::<_, ApprovalRequest>(
            "INSERT INTO approvals (id, asset_id, action, status, requested_by, requested_at, \
                                    reviewed_by, reviewed_at, notes, patch, department) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING *",
        )
        .bind(&record.id)
        .bind(&record.asset_id)
        .bind(record.action)
        .bind(record.status)
        .bind(&record.requested_by)
        .bind(record.requested_at)
        .bind(&record.reviewed_by)
        .bind(record.reviewed_at)
        .bind(&record.notes)
        .bind(&record.patch)
        .bind(&record.department)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.constraint() == Some("approvals_pkey") => {
                AppError::conflict(format!("Approval '{}' already exists", record.id))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create approval", e),
        })
    }

    async fn update_on(
        conn: &mut PgConnection,
        id: &ApprovalId,
        update: &ApprovalUpdate,
    ) -> AppResult<Option<ApprovalRequest>> {
        if update.is_empty() {
            return sqlx::query_as::<_, ApprovalRequest>("SELECT * FROM approvals WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *conn)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to find approval by id", e)
                });
        }

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE approvals SET ");
        {
            let mut fields = qb.separated(", ");
            if let Some(status) = update.status {
                fields.push("status = ").push_bind_unseparated(status);
            }
            if let Some(reviewed_by) = &update.reviewed_by {
                fields
                    .push("reviewed_by = ")
                    .push_bind_unseparated(reviewed_by.clone());
            }
            if let Some(reviewed_at) = &update.reviewed_at {
                fields
                    .push("reviewed_at = ")
                    .push_bind_unseparated(*reviewed_at);
            }
            if let Some(notes) = &update.notes {
                fields.push("notes = ").push_bind_unseparated(notes.clone());
            }
            if let Some(patch) = &update.patch {
                fields.push("patch = ").push_bind_unseparated(patch.clone());
            }
            if let Some(department) = &update.department {
                fields
                    .push("department = ")
                    .push_bind_unseparated(department.clone());
            }
        }
        qb.push(" WHERE id = ").push_bind(id.clone());
        qb.push(" RETURNING *");

        qb.build_query_as::<ApprovalRequest>()
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update approval", e))
    }
}

fn acquire_err(e: sqlx::Error) -> AppError {
    AppError::with_source(ErrorKind::Database, "Failed to acquire connection", e)
}

fn begin_err(e: sqlx::Error) -> AppError {
    AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
}

fn commit_err(e: sqlx::Error) -> AppError {
    AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
}
