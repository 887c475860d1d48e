//! HTTP request handlers.

pub mod approvals;
pub mod assets;
pub mod events;
pub mod health;
pub mod notifications;
