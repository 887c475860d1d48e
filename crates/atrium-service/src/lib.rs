//! # atrium-service
//!
//! Business logic for the approval workflow: the state machine itself,
//! the remote-then-mirror degrade policy, notification fan-out, and the
//! collaborator ports (asset updates, user directory).

pub mod approval;
pub mod asset;
pub mod directory;
pub mod notify;

pub use approval::service::ApprovalService;
pub use approval::store::{ApprovalStore, RemoteError};
