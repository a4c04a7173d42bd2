//! API Extractors
//!
//! Request-side pieces the handlers need: the cacheable request shape and the
//! caller identity supplied by the upstream identity provider.

use std::convert::Infallible;

use axum::{async_trait, extract::FromRequestParts, http::header, http::request::Parts};

use crate::cache::CacheRequest;
use crate::error::ApiError;

/// Authorization scheme carrying the opaque authenticated-user identifier.
pub const BEARER_SCHEME: &str = "Bearer";

#[async_trait]
impl<S> FromRequestParts<S> for CacheRequest
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CacheRequest::from_uri(parts.method.clone(), &parts.uri))
    }
}

/// Identifier of the signed-in user, read from `Authorization: Bearer <id>`.
/// The id is treated as an opaque string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .map(|token| AuthenticatedUser(token.to_string()))
            .ok_or_else(|| ApiError::Unauthorized("Missing bearer user id".to_string()))
    }
}

/// Token of a `Bearer` credential; the scheme is case-insensitive.
fn bearer_token(raw: &str) -> Option<&str> {
    let (scheme, token) = raw.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }
    Some(token.trim()).filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Method, Request};

    fn parts(builder: axum::http::request::Builder) -> Parts {
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_cache_request_extraction() {
        let mut parts = parts(Request::builder().uri("/petitions?offset=0&limit=10"));

        let request = CacheRequest::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.path, "/petitions");
        assert_eq!(request.query_value("limit"), Some("10"));
    }

    #[tokio::test]
    async fn test_authenticated_user() {
        let mut with_header = parts(Request::builder().header("authorization", "Bearer  7 "));
        let user = AuthenticatedUser::from_request_parts(&mut with_header, &())
            .await
            .unwrap();
        assert_eq!(user, AuthenticatedUser("7".to_string()));

        let mut lowercase = parts(Request::builder().header("authorization", "bearer user-42"));
        let user = AuthenticatedUser::from_request_parts(&mut lowercase, &())
            .await
            .unwrap();
        assert_eq!(user, AuthenticatedUser("user-42".to_string()));

        let mut without = parts(Request::builder());
        let result = AuthenticatedUser::from_request_parts(&mut without, &()).await;
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn test_bearer_token_rejects_other_schemes() {
        assert_eq!(bearer_token("Basic dXNlcjpwYXNz"), None);
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token("Bearer   "), None);
        assert_eq!(bearer_token(" Bearer 7"), Some("7"));
    }
}
