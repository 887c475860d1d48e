//! Route definitions for the Atrium HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via
//! Axum's `State` extractor.

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers;
use crate::state::AppState;

/// Build the route tree (no middleware; see [`crate::app::build_app`]).
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(approval_routes())
        .merge(event_routes())
        .merge(asset_routes())
        .merge(notification_routes())
        .merge(health_routes());

    Router::new().nest("/api", api_routes).with_state(state)
}

/// Approval storage surface + workflow routes.
fn approval_routes() -> Router<AppState> {
    Router::new()
        .route("/approvals", get(handlers::approvals::list_approvals))
        .route("/approvals", post(handlers::approvals::create_approval))
        .route("/approvals/submit", post(handlers::approvals::submit_approval))
        .route(
            "/approvals/resync-departments",
            post(handlers::approvals::resync_departments),
        )
        .route("/approvals/{id}", get(handlers::approvals::get_approval))
        .route("/approvals/{id}", put(handlers::approvals::update_approval))
        .route(
            "/approvals/{id}/forward",
            post(handlers::approvals::forward_approval),
        )
        .route(
            "/approvals/{id}/decision",
            post(handlers::approvals::decide_approval),
        )
        .route(
            "/approvals/{id}/override",
            post(handlers::approvals::override_approval),
        )
        .route(
            "/approvals/{id}/patch",
            put(handlers::approvals::update_approval_patch),
        )
        .route(
            "/approvals/{id}/comments",
            post(handlers::approvals::add_comment),
        )
}

/// Append-only audit trail.
fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/approval-events", get(handlers::events::list_events))
        .route("/approval-events", post(handlers::events::append_event))
}

/// Asset collaborator surface.
fn asset_routes() -> Router<AppState> {
    Router::new()
        .route("/assets/{id}", get(handlers::assets::get_asset))
        .route("/assets/{id}", put(handlers::assets::update_asset))
}

/// In-app notification store.
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/notifications",
            get(handlers::notifications::list_notifications),
        )
        .route(
            "/notifications/unread-count",
            get(handlers::notifications::unread_count),
        )
        .route(
            "/notifications/{id}/read",
            post(handlers::notifications::mark_read),
        )
}

/// Liveness.
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
