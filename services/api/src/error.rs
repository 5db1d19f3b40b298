//! Error taxonomy for the request boundary
//!
//! Every failure a handler can produce is translated here into a status code
//! plus a structured JSON body; nothing propagates to the caller as an
//! unhandled fault. Database details go to the log, never to the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::pagination::PageTokenError;
use crate::validation::EMAIL_TAKEN;

/// Unique index backing case-insensitive email uniqueness
pub const UQ_USERS_EMAIL: &str = "uq_users_email_address";

/// Unique index that makes duplicate session tokens fail loudly
pub const UQ_SESSIONS_TOKEN: &str = "uq_sessions_token";

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Login rejected; the message never says which field was wrong
    #[error("Invalid email address or password")]
    InvalidCredentials,

    /// Missing, malformed, or unknown bearer token
    #[error("Unauthorized")]
    Unauthorized,

    /// Unknown employee id
    #[error("Employee not found")]
    NotFound,

    /// One or more field violations, all collected together
    #[error("validation failed")]
    Validation(Vec<String>),

    /// Malformed pagination cursor
    #[error(transparent)]
    PageToken(#[from] PageTokenError),

    /// Query or connection failure
    #[error("database error: {0}")]
    Database(sqlx::Error),

    /// Anything else unexpected
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                json!("Invalid email address or password"),
            ),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, json!("Unauthorized")),
            ApiError::NotFound => (StatusCode::NOT_FOUND, json!("Employee not found")),
            ApiError::Validation(messages) => (StatusCode::UNPROCESSABLE_ENTITY, json!(messages)),
            ApiError::PageToken(e) => (StatusCode::BAD_REQUEST, json!(e.to_string())),
            ApiError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!("Internal server error"),
                )
            }
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!("Internal server error"),
                )
            }
        };

        (status, Json(json!({ "error": error }))).into_response()
    }
}

/// Whether an error is a unique violation of the named constraint
pub fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation() && db.constraint() == Some(constraint))
}

impl From<sqlx::Error> for ApiError {
    /// Classify database failures before they reach the boundary
    ///
    /// A duplicate-email race (two concurrent registrations passing the
    /// validation-time check) hits the unique index; it renders as the same
    /// 422 shape as the normal uniqueness message, not a server error.
    fn from(err: sqlx::Error) -> Self {
        if is_unique_violation(&err, UQ_USERS_EMAIL) {
            return ApiError::Validation(vec![EMAIL_TAKEN.to_string()]);
        }

        ApiError::Database(err)
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
