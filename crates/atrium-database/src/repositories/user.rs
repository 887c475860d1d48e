//! User repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use atrium_core::error::{AppError, ErrorKind};
use atrium_core::result::AppResult;
use atrium_entity::user::{User, UserRole};

/// Repository for user lookups.
///
/// The approval workflow only reads users: recipient resolution and
/// department directory lookups. Account management lives elsewhere.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM app_users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM app_users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by email", e)
            })
    }

    /// Snapshot the full directory (used by department resync).
    pub async fn find_all(&self) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM app_users ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list users", e))
    }

    /// Resolve active manager email addresses, optionally scoped to a
    /// department (case-insensitive).
    pub async fn manager_emails(&self, department: Option<&str>) -> AppResult<Vec<String>> {
        let emails = match department {
            Some(department) => {
                sqlx::query_scalar::<_, String>(
                    "SELECT email FROM app_users \
                     WHERE role = $1 AND status = 'active' AND LOWER(department) = LOWER($2) \
                     ORDER BY email ASC",
                )
                .bind(UserRole::Manager)
                .bind(department)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_scalar::<_, String>(
                    "SELECT email FROM app_users \
                     WHERE role = $1 AND status = 'active' ORDER BY email ASC",
                )
                .bind(UserRole::Manager)
                .fetch_all(&self.pool)
                .await
            }
        };
        emails.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to resolve manager emails", e)
        })
    }

    /// Resolve active admin email addresses.
    pub async fn admin_emails(&self) -> AppResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT email FROM app_users WHERE role = $1 AND status = 'active' ORDER BY email ASC",
        )
        .bind(UserRole::Admin)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to resolve admin emails", e)
        })
    }
}
