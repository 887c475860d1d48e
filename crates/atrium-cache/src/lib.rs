//! # atrium-cache
//!
//! The availability layer of the approval workflow: a best-effort local
//! mirror of server-held data consulted when the remote store is
//! unreachable, and a TTL'd cache for filtered list queries.
//!
//! The mirror offers no conflict resolution; the next successful remote
//! read silently replaces whatever it holds.

pub mod keys;
pub mod list_cache;
pub mod mirror;

pub use list_cache::ListCache;
pub use mirror::MirrorStore;
