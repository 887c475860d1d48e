//! Approval event repository implementation.
//!
//! The `approval_events` table is append-only: no update or delete
//! statements exist anywhere in this module.

use sqlx::{PgConnection, PgPool};

use atrium_core::error::{AppError, ErrorKind};
use atrium_core::result::AppResult;
use atrium_core::types::id::ApprovalId;
use atrium_entity::event::ApprovalEvent;

/// Repository for the append-only approval audit trail.
#[derive(Debug, Clone)]
pub struct ApprovalEventRepository {
    pool: PgPool,
}

impl ApprovalEventRepository {
    /// Create a new event repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append an event.
    pub async fn insert(&self, event: &ApprovalEvent) -> AppResult<ApprovalEvent> {
        Self::insert_on(&mut *self.pool.acquire().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to acquire connection", e)
        })?, event)
        .await
    }

    /// Append an event on an existing connection or transaction.
    pub async fn insert_on(
        conn: &mut PgConnection,
        event: &ApprovalEvent,
    ) -> AppResult<ApprovalEvent> {
        sqlx::query_as::<_, ApprovalEvent>(
            "INSERT INTO approval_events (id, approval_id, kind, author, message, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(&event.id)
        .bind(&event.approval_id)
        .bind(event.kind)
        .bind(&event.author)
        .bind(&event.message)
        .bind(event.created_at)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to append event", e))
    }

    /// List events for one approval, oldest first (display order).
    pub async fn find_by_approval(&self, approval_id: &ApprovalId) -> AppResult<Vec<ApprovalEvent>> {
        sqlx::query_as::<_, ApprovalEvent>(
            "SELECT * FROM approval_events WHERE approval_id = $1 ORDER BY created_at ASC",
        )
        .bind(approval_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list events", e))
    }
}
