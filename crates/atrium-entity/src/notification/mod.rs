//! In-app notification entity.

pub mod model;

pub use model::Notification;
