//! Approval workflow: state machine, storage port, and resync.

pub mod http;
pub mod pg;
pub mod resync;
pub mod service;
pub mod store;

pub use http::HttpApprovalStore;
pub use pg::PgApprovalStore;
pub use resync::ResyncReport;
pub use service::ApprovalService;
pub use store::{ApprovalStore, FinalizeOutcome, RemoteError, StorePatch};
