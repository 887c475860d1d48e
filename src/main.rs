//! Atrium Server — asset approval workflow service.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use atrium_api::AppState;
use atrium_cache::{ListCache, MirrorStore};
use atrium_core::config::AppConfig;
use atrium_core::error::AppError;
use atrium_database::repositories::approval::ApprovalRepository;
use atrium_database::repositories::asset::AssetRepository;
use atrium_database::repositories::event::ApprovalEventRepository;
use atrium_database::repositories::notification::NotificationRepository;
use atrium_database::repositories::user::UserRepository;
use atrium_service::approval::pg::PgApprovalStore;
use atrium_service::approval::ApprovalService;
use atrium_service::asset::PgAssetUpdater;
use atrium_service::directory::{PgUserDirectory, UserDirectory};
use atrium_service::notify::{ApprovalNotifier, DirectoryNotifier};
use atrium_service::ApprovalStore;

#[tokio::main]
async fn main() {
    let env = std::env::var("ATRIUM_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt().json().with_env_filter(filter).with_target(true).init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function.
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Atrium v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let db_pool = atrium_database::connection::create_pool(&config.database).await?;
    atrium_database::migration::run_migrations(&db_pool).await?;

    // ── Step 2: Repositories ─────────────────────────────────────
    let approval_repo = Arc::new(ApprovalRepository::new(db_pool.clone()));
    let event_repo = Arc::new(ApprovalEventRepository::new(db_pool.clone()));
    let asset_repo = Arc::new(AssetRepository::new(db_pool.clone()));
    let user_repo = Arc::new(UserRepository::new(db_pool.clone()));
    let notification_repo = Arc::new(NotificationRepository::new(db_pool.clone()));

    // ── Step 3: Mirror + list cache ──────────────────────────────
    let mirror = Arc::new(MirrorStore::new());
    let lists = Arc::new(ListCache::new(&config.cache));

    // ── Step 4: Workflow ports ───────────────────────────────────
    let store = Arc::new(PgApprovalStore::new(
        Arc::clone(&approval_repo),
        Arc::clone(&event_repo),
    ));
    let directory = Arc::new(PgUserDirectory::new(Arc::clone(&user_repo)));
    let assets = Arc::new(PgAssetUpdater::new(Arc::clone(&asset_repo)));
    let notifier = Arc::new(DirectoryNotifier::new(
        Arc::clone(&user_repo),
        Arc::clone(&notification_repo),
        Arc::clone(&directory) as Arc<dyn UserDirectory>,
        config.notifier.clone(),
    ));

    // ── Step 5: The approval service ─────────────────────────────
    let approval_service = Arc::new(ApprovalService::new(
        store as Arc<dyn ApprovalStore>,
        Arc::clone(&mirror),
        Arc::clone(&lists),
        notifier as Arc<dyn ApprovalNotifier>,
        assets,
        directory,
    ));

    // ── Step 6: HTTP state + serve ───────────────────────────────
    let state = AppState {
        config: Arc::new(config),
        db_pool,
        approval_repo,
        event_repo,
        asset_repo,
        user_repo,
        notification_repo,
        approval_service,
    };

    atrium_api::serve(state).await
}
