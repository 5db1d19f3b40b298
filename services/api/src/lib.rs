//! Employee records backend
//!
//! HTTP service with opaque-token session authentication and cursor
//! pagination over Postgres. The binary in `main.rs` wires configuration,
//! the pool, and the router together; everything else lives here so the
//! integration tests can drive the same code paths.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod password;
pub mod phone;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod token;
pub mod validation;

/// Schema migrations embedded at build time
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();
