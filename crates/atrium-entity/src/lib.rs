//! # atrium-entity
//!
//! Domain entity models and enums for Atrium: approval requests, their
//! append-only audit events, and the collaborator entities (users, assets,
//! in-app notifications) the workflow touches.

pub mod approval;
pub mod asset;
pub mod event;
pub mod notification;
pub mod user;

pub use approval::{ApprovalAction, ApprovalFilter, ApprovalRequest, ApprovalStatus, ApprovalUpdate, Decision, SubmitApproval};
pub use asset::{Asset, AssetPatch};
pub use event::{ApprovalEvent, EventKind};
pub use notification::Notification;
pub use user::{User, UserRole, UserStatus};
