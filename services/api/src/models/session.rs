//! Session domain model
//!
//! One row per issued bearer token. Sessions carry client metadata for
//! audit and are revoked by deleting the row; there is no expiry column.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A persisted session
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub user_id: i64,
    pub token: String,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Client metadata captured when a session starts
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}
