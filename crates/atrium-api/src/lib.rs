//! # atrium-api
//!
//! HTTP layer for Atrium: the plain JSON REST surface over approvals,
//! their audit events, assets, and in-app notifications, plus the
//! workflow routes that drive the approval state machine.

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use app::{build_app, serve};
pub use state::AppState;
