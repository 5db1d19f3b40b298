//! Error types shared across services
//!
//! Database-level failures are wrapped here so services can decide how to
//! surface them without matching on raw sqlx errors.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish a connection to the database
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// A query failed to execute
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Schema migration failed to apply
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Invalid database configuration
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;
