//! # Tasklist Shared Library
//!
//! Authentication core and storage layer for the Tasklist API server.
//!
//! ## Module Organization
//!
//! - `auth`: Credential hashing, session token codec, request middleware
//! - `db`: PostgreSQL pool and migrations
//! - `models`: Accounts, sessions and tasks
//! - `store`: Account store and task store over pluggable backends

pub mod auth;
pub mod db;
pub mod models;
pub mod store;

/// Current version of the Tasklist shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
