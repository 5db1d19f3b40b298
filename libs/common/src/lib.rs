//! Common library for the employees backend
//!
//! This crate provides the shared infrastructure layer: database
//! connectivity, migrations, and the error types that wrap it.

pub mod database;
pub mod error;
