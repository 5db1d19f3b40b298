//! Request authentication extractors
//!
//! The bearer token is the sole lookup key against the sessions table.
//! Handlers take [`CurrentSession`] as a parameter to require authentication,
//! so the request identity travels through handler arguments rather than
//! shared state. Missing or malformed credentials are indistinguishable from
//! unknown tokens: all reject as unauthorized.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;

use crate::error::ApiError;
use crate::models::employee::Employee;
use crate::models::session::{ClientInfo, Session};
use crate::state::AppState;
use crate::token;

/// Well-formed bearer token taken from the `Authorization` header
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(auth) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::Unauthorized)?;

        let token = auth.token().to_string();
        if !token::is_well_formed(&token) {
            return Err(ApiError::Unauthorized);
        }

        Ok(BearerToken(token))
    }
}

/// The session and identity behind the request's bearer token
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub session: Session,
    pub employee: Employee,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;

        let session = state
            .session_repository
            .find_by_token(&token)
            .await?
            .ok_or(ApiError::Unauthorized)?;

        let employee = state
            .employee_repository
            .find_by_id(session.user_id)
            .await?
            .ok_or(ApiError::Unauthorized)?;

        Ok(CurrentSession { session, employee })
    }
}

/// Client metadata recorded on sessions a request creates
///
/// Audit-only; never consulted for authorization.
#[derive(Debug, Clone)]
pub struct ClientMeta(pub ClientInfo);

#[async_trait]
impl<S> FromRequestParts<S> for ClientMeta
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_agent = parts
            .headers
            .get(axum::http::header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        // First hop of X-Forwarded-For when present, since the service is
        // expected to sit behind a proxy.
        let ip_address = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string());

        Ok(ClientMeta(ClientInfo {
            user_agent,
            ip_address,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_for(request: Request<()>) -> Parts {
        request.into_parts().0
    }

    #[tokio::test]
    async fn test_bearer_token_accepts_well_formed_token() {
        let token = token::generate();
        let request = Request::builder()
            .header("authorization", format!("Bearer {token}"))
            .body(())
            .unwrap();

        let extracted = BearerToken::from_request_parts(&mut parts_for(request), &())
            .await
            .expect("Well-formed token should be accepted");
        assert_eq!(extracted.0, token);
    }

    #[tokio::test]
    async fn test_bearer_token_rejects_missing_header() {
        let request = Request::builder().body(()).unwrap();

        let result = BearerToken::from_request_parts(&mut parts_for(request), &()).await;
        assert!(matches!(result, Err(ApiError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_bearer_token_rejects_wrong_scheme() {
        let request = Request::builder()
            .header("authorization", "Basic dXNlcjpwYXNz")
            .body(())
            .unwrap();

        let result = BearerToken::from_request_parts(&mut parts_for(request), &()).await;
        assert!(matches!(result, Err(ApiError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_bearer_token_rejects_malformed_token() {
        for bad in ["short", "has_underscores_in_here_x", &"x".repeat(40)] {
            let request = Request::builder()
                .header("authorization", format!("Bearer {bad}"))
                .body(())
                .unwrap();

            let result = BearerToken::from_request_parts(&mut parts_for(request), &()).await;
            assert!(
                matches!(result, Err(ApiError::Unauthorized)),
                "{bad:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_client_meta_reads_headers() {
        let request = Request::builder()
            .header("user-agent", "integration-test/1.0")
            .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
            .body(())
            .unwrap();

        let ClientMeta(info) = ClientMeta::from_request_parts(&mut parts_for(request), &())
            .await
            .expect("ClientMeta extraction is infallible");
        assert_eq!(info.user_agent.as_deref(), Some("integration-test/1.0"));
        assert_eq!(info.ip_address.as_deref(), Some("203.0.113.9"));
    }

    #[tokio::test]
    async fn test_client_meta_tolerates_absent_headers() {
        let request = Request::builder().body(()).unwrap();

        let ClientMeta(info) = ClientMeta::from_request_parts(&mut parts_for(request), &())
            .await
            .expect("ClientMeta extraction is infallible");
        assert!(info.user_agent.is_none());
        assert!(info.ip_address.is_none());
    }
}
