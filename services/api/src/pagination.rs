//! Cursor pagination over the employee collection
//!
//! Keyset pagination ordered by ascending primary key. Positions are carried
//! in opaque page tokens: URL-safe base64 (no padding) over a small versioned
//! JSON payload holding the boundary key and a direction. Tokens are derived
//! per request and never persisted.
//!
//! Queries use strict inequalities (`id > key` forward, `id < key` backward),
//! so a boundary key that was deleted after its token was issued degrades
//! gracefully: the page simply starts at the nearest surviving key. Each
//! continuation token is emitted exactly when records exist past the
//! corresponding edge of the page. A token pointing past either end of the
//! collection yields an empty page; while records remain on the far side of
//! its boundary, the opposite-direction token re-enters the collection.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde_json::json;
use thiserror::Error;

/// Fixed number of records per page
pub const PAGE_SIZE: usize = 10;

const TOKEN_VERSION: u64 = 1;

/// Pagination direction relative to a boundary key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Records strictly after the boundary key
    Forward,
    /// Records strictly before the boundary key
    Backward,
}

impl Direction {
    fn as_str(&self) -> &'static str {
        match self {
            Direction::Forward => "next",
            Direction::Backward => "prev",
        }
    }
}

/// Why a page token failed to decode
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PageTokenError {
    /// Not valid URL-safe base64
    #[error("page token is not valid base64")]
    InvalidEncoding,

    /// Decoded bytes are not a JSON object
    #[error("page token payload is malformed")]
    InvalidPayload,

    /// Version field missing or not one this build understands
    #[error("page token version is not supported")]
    UnsupportedVersion,

    /// Boundary key field missing or not an integer
    #[error("page token is missing its boundary key")]
    MissingKey,

    /// Direction field missing or unrecognized
    #[error("page token direction is not recognized")]
    UnknownDirection,
}

/// Decoded boundary position used to resume pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageToken {
    pub key: i64,
    pub direction: Direction,
}

impl PageToken {
    pub fn new(key: i64, direction: Direction) -> Self {
        Self { key, direction }
    }

    /// Encode into the opaque wire form
    pub fn encode(&self) -> String {
        let payload = json!({
            "v": TOKEN_VERSION,
            "k": self.key,
            "d": self.direction.as_str(),
        });

        URL_SAFE_NO_PAD.encode(payload.to_string())
    }

    /// Decode an opaque token back into a boundary position
    ///
    /// Same token, same position: decoding is deterministic and rejects
    /// anything this build did not produce.
    pub fn decode(token: &str) -> Result<Self, PageTokenError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| PageTokenError::InvalidEncoding)?;

        let payload: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(|_| PageTokenError::InvalidPayload)?;

        if payload.get("v").and_then(|v| v.as_u64()) != Some(TOKEN_VERSION) {
            return Err(PageTokenError::UnsupportedVersion);
        }

        let key = payload
            .get("k")
            .and_then(|k| k.as_i64())
            .ok_or(PageTokenError::MissingKey)?;

        let direction = match payload.get("d").and_then(|d| d.as_str()) {
            Some("next") => Direction::Forward,
            Some("prev") => Direction::Backward,
            _ => return Err(PageTokenError::UnknownDirection),
        };

        Ok(Self { key, direction })
    }
}

/// One bounded slice of the collection plus continuation tokens
#[derive(Debug)]
pub struct Page<T> {
    /// Records in ascending key order, at most [`PAGE_SIZE`]
    pub records: Vec<T>,
    /// Token for the page after this one, absent on the last page
    pub next_token: Option<String>,
    /// Token for the page before this one, absent on the first page
    pub prev_token: Option<String>,
}

/// Assemble a page from a lookahead fetch
///
/// `rows` must be the result of fetching `limit + 1` records relative to
/// `origin`: ascending from the start (no origin), ascending strictly after
/// the boundary (forward), or descending strictly before it (backward). The
/// extra row only signals that another page exists; it is never returned.
///
/// `beyond_origin` reports whether any record exists on the far side of the
/// origin boundary: before the page for forward fetches, after it for
/// backward ones. The matching token is emitted only when it is true, so
/// both tokens are present exactly when records exist past that edge. It is
/// ignored without an origin, since the first page has nothing before it.
pub fn assemble<T, F>(
    mut rows: Vec<T>,
    key_of: F,
    limit: usize,
    origin: Option<&PageToken>,
    beyond_origin: bool,
) -> Page<T>
where
    F: Fn(&T) -> i64,
{
    let has_more = rows.len() > limit;
    rows.truncate(limit);

    match origin {
        None => {
            let next_token = if has_more {
                rows.last()
                    .map(|r| PageToken::new(key_of(r), Direction::Forward).encode())
            } else {
                None
            };

            Page {
                records: rows,
                next_token,
                prev_token: None,
            }
        }
        Some(token) if token.direction == Direction::Forward => {
            let next_token = if has_more {
                rows.last()
                    .map(|r| PageToken::new(key_of(r), Direction::Forward).encode())
            } else {
                None
            };

            // An empty page means the boundary is past the end; the re-entry
            // boundary just above it keeps the tail reachable.
            let prev_token = beyond_origin.then(|| {
                let boundary = rows
                    .first()
                    .map(|r| key_of(r))
                    .unwrap_or_else(|| token.key.saturating_add(1));
                PageToken::new(boundary, Direction::Backward).encode()
            });

            Page {
                records: rows,
                next_token,
                prev_token,
            }
        }
        Some(token) => {
            // Backward fetches arrive in descending order; render ascending.
            rows.reverse();

            let prev_token = if has_more {
                rows.first()
                    .map(|r| PageToken::new(key_of(r), Direction::Backward).encode())
            } else {
                None
            };

            let next_token = beyond_origin.then(|| {
                let boundary = rows
                    .last()
                    .map(|r| key_of(r))
                    .unwrap_or_else(|| token.key.saturating_sub(1));
                PageToken::new(boundary, Direction::Forward).encode()
            });

            Page {
                records: rows,
                next_token,
                prev_token,
            }
        }
    }
}
