//! Response Module
//!
//! Builds JSON responses that carry cache-state metadata and CORS headers.
//! Error responses are always marked non-cacheable.

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, error, info};

use crate::error::ApiError;
use crate::models::ErrorResponse;

/// Marker header carrying the cache outcome.
pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// Remaining (hit) or granted (miss) lifetime in seconds.
pub const X_CACHE_TTL: HeaderName = HeaderName::from_static("x-cache-ttl");

/// Methods advertised to browsers.
pub const CORS_ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";

/// Request headers advertised to browsers.
pub const CORS_ALLOWED_HEADERS: &str = "Content-Type, Authorization";

const MAX_ERROR_MESSAGE_CHARS: usize = 200;
const GENERIC_ERROR_MESSAGE: &str = "Internal server error";

// == Cache Status ==
/// How a response relates to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Served from the store
    Hit,
    /// Computed and stored
    Miss,
    /// Computed and deliberately not stored
    Bypass,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
            CacheStatus::Bypass => "BYPASS",
        }
    }
}

// == Success Responses ==
/// Wraps an already-serialized JSON payload.
///
/// `ttl_seconds` is written to `X-Cache-TTL` when present. Bypass responses
/// also get `Cache-Control: no-store`.
pub fn json_payload_response(
    status: StatusCode,
    payload: String,
    cache_status: CacheStatus,
    ttl_seconds: Option<u64>,
) -> Response {
    let mut response = Response::new(Body::from(payload));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(X_CACHE, HeaderValue::from_static(cache_status.as_str()));
    if let Some(ttl) = ttl_seconds {
        headers.insert(X_CACHE_TTL, HeaderValue::from(ttl));
    }
    if cache_status == CacheStatus::Bypass {
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    }
    apply_cors_headers(headers);
    response
}

/// Serializes `payload` into an uncached response, e.g. the result of a write.
pub fn uncached_json<T: Serialize>(status: StatusCode, payload: &T) -> Response {
    match serde_json::to_string(payload) {
        Ok(body) => json_payload_response(status, body, CacheStatus::Bypass, None),
        Err(err) => build_error_response(ApiError::from(err), StatusCode::INTERNAL_SERVER_ERROR),
    }
}

// == Error Response Builder ==
/// Turns an error into a `{ "error": message }` response.
///
/// The status is the error's own, or `default_status` for errors that carry
/// none. Unknown errors are logged in full and sanitized before they reach
/// the body. The store is never touched.
pub fn build_error_response(err: impl Into<ApiError>, default_status: StatusCode) -> Response {
    let err = err.into();
    let status = err.status_or(default_status);

    let message = match &err {
        ApiError::Validation(msg) => {
            info!(status = status.as_u16(), "Rejected request: {}", msg);
            msg.clone()
        }
        ApiError::Unknown { message, .. } => {
            error!(status = status.as_u16(), "Request failed: {}", message);
            sanitize_message(message)
        }
        other => {
            debug!(status = status.as_u16(), "Request error: {}", other);
            other.to_string()
        }
    };

    let mut response = (status, Json(ErrorResponse::new(message))).into_response();
    let headers = response.headers_mut();
    headers.insert(X_CACHE, HeaderValue::from_static(CacheStatus::Bypass.as_str()));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    apply_cors_headers(headers);
    response
}

// == CORS ==
/// Writes the permissive CORS headers, replacing any existing values.
pub fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(CORS_ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(CORS_ALLOWED_HEADERS),
    );
}

// == Sanitize ==
/// Keeps the first line, drops control characters and caps the length.
fn sanitize_message(raw: &str) -> String {
    let first_line = raw.lines().next().unwrap_or_default();
    let cleaned: String = first_line
        .chars()
        .filter(|c| !c.is_control())
        .take(MAX_ERROR_MESSAGE_CHARS)
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        GENERIC_ERROR_MESSAGE.to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_error_response_shape() {
        let response = build_error_response(
            ApiError::NotFound("Petition not found".into()),
            StatusCode::INTERNAL_SERVER_ERROR,
        );

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[X_CACHE], "BYPASS");
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");

        let json = body_json(response).await;
        assert_eq!(json["error"], "Petition not found");
    }

    #[tokio::test]
    async fn test_error_response_default_status() {
        let response = build_error_response("database exploded", StatusCode::BAD_GATEWAY);
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let json = body_json(response).await;
        assert_eq!(json["error"], "database exploded");
    }

    #[tokio::test]
    async fn test_unknown_error_is_sanitized() {
        let raw = "query failed\n   at db::pool::run (pool.rs:88)\n   at main";
        let response = build_error_response(ApiError::unknown(raw), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["error"], "query failed");
    }

    #[test]
    fn test_sanitize_message() {
        assert_eq!(sanitize_message(""), GENERIC_ERROR_MESSAGE);
        assert_eq!(sanitize_message("\u{7}\n"), GENERIC_ERROR_MESSAGE);
        assert_eq!(sanitize_message("bad\tthing"), "badthing");
        assert_eq!(sanitize_message(&"x".repeat(500)).len(), MAX_ERROR_MESSAGE_CHARS);
    }

    #[tokio::test]
    async fn test_payload_response_headers() {
        let response =
            json_payload_response(StatusCode::OK, "[1,2]".into(), CacheStatus::Hit, Some(42));

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[X_CACHE], "HIT");
        assert_eq!(response.headers()[X_CACHE_TTL], "42");
        assert!(response.headers().get(header::CACHE_CONTROL).is_none());
        assert_eq!(body_json(response).await, serde_json::json!([1, 2]));
    }

    #[tokio::test]
    async fn test_uncached_json() {
        let response = uncached_json(StatusCode::CREATED, &serde_json::json!({"id": 1}));

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[X_CACHE], "BYPASS");
        assert!(response.headers().get(X_CACHE_TTL).is_none());
    }
}
