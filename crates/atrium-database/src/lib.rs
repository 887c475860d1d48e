//! # atrium-database
//!
//! PostgreSQL connection management and concrete repository
//! implementations for all Atrium entities.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::create_pool;
