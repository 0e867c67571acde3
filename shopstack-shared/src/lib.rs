//! # shopstack shared library
//!
//! Types and database logic shared across the shopstack services.
//!
//! ## Module organization
//!
//! - `models`: database models and their CRUD operations
//! - `auth`: JWT tokens, password hashing, reset tokens, and the axum
//!   authentication/authorization middleware
//! - `db`: connection pool and migration runner

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the shopstack shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
