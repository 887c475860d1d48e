//! Application state shared across all handlers.

use std::sync::Arc;

use sqlx::PgPool;

use atrium_core::config::AppConfig;
use atrium_database::repositories::approval::ApprovalRepository;
use atrium_database::repositories::asset::AssetRepository;
use atrium_database::repositories::event::ApprovalEventRepository;
use atrium_database::repositories::notification::NotificationRepository;
use atrium_database::repositories::user::UserRepository;
use atrium_service::ApprovalService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool.
    pub db_pool: PgPool,

    // ── Repositories ─────────────────────────────────────────
    /// Approval repository (storage surface).
    pub approval_repo: Arc<ApprovalRepository>,
    /// Approval event repository.
    pub event_repo: Arc<ApprovalEventRepository>,
    /// Asset repository.
    pub asset_repo: Arc<AssetRepository>,
    /// User repository.
    pub user_repo: Arc<UserRepository>,
    /// In-app notification repository.
    pub notification_repo: Arc<NotificationRepository>,

    // ── Services ─────────────────────────────────────────────
    /// The approval workflow service.
    pub approval_service: Arc<ApprovalService>,
}
