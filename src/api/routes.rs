//! API Routes
//!
//! Configures the Axum router with the petition endpoints.

use axum::{
    extract::Request,
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    create_petition_handler, create_signature_handler, get_petition_by_slug_handler,
    get_petition_handler, health_handler, list_categories_handler, list_petitions_handler,
    not_found_handler, publish_petition_handler, stats_handler, user_signature_ids_handler,
    user_signatures_handler, AppState,
};
use crate::error::ApiError;
use crate::response::{apply_cors_headers, build_error_response};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /petitions` / `POST /petitions`
/// - `GET /petitions/:id`, `POST /petitions/:id/publish`
/// - `GET /petition/:slug`
/// - `GET /categories`
/// - `GET /users/:user_id/signatures`, `GET /users/:user_id/signatures/ids`
/// - `POST /signatures`
/// - `GET /stats`, `GET /health`
///
/// # Middleware
/// - Method fallback: JSON 405 bodies, bare `OPTIONS` answered with 204
/// - CORS: any origin, fixed methods and headers
/// - Tracing: request spans
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route(
            "/petitions",
            get(list_petitions_handler).post(create_petition_handler),
        )
        .route("/petitions/:id", get(get_petition_handler))
        .route("/petitions/:id/publish", post(publish_petition_handler))
        .route("/petition/:slug", get(get_petition_by_slug_handler))
        .route("/categories", get(list_categories_handler))
        .route("/users/:user_id/signatures", get(user_signatures_handler))
        .route(
            "/users/:user_id/signatures/ids",
            get(user_signature_ids_handler),
        )
        .route("/signatures", post(create_signature_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .fallback(not_found_handler)
        .layer(middleware::from_fn(method_fallback))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Rewrites the router's empty 405 into a JSON error and answers `OPTIONS`
/// requests that the CORS layer did not treat as a preflight.
async fn method_fallback(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let response = next.run(request).await;

    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }

    let allow = response.headers().get(header::ALLOW).cloned();

    let mut rewritten = if method == Method::OPTIONS {
        let mut preflight = StatusCode::NO_CONTENT.into_response();
        apply_cors_headers(preflight.headers_mut());
        preflight
    } else {
        build_error_response(ApiError::MethodNotAllowed, StatusCode::METHOD_NOT_ALLOWED)
    };

    if let Some(allow) = allow {
        rewritten.headers_mut().insert(header::ALLOW, allow);
    } else if method == Method::OPTIONS {
        rewritten
            .headers_mut()
            .insert(header::ALLOW, HeaderValue::from_static("OPTIONS"));
    }
    rewritten
}
