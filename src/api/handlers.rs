//! API Handlers
//!
//! Thin handlers over the petition repository. Reads go through the
//! [`ResponseCache`]; writes call the repository, await invalidation of the
//! affected prefixes and answer uncached.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Response,
    Json,
};

use crate::api::extract::AuthenticatedUser;
use crate::cache::{
    CacheNamespace, CachePrefix, CacheRequest, CacheStats, CacheStore, Clock,
    InvalidationBroadcaster, MemoryStore, ResponseCache, SystemClock,
};
use crate::config::{Config, EndpointTtls};
use crate::error::{ApiError, ApiResult};
use crate::models::{
    parse_number, CreatePetitionRequest, HealthResponse, ListParams, SignRequest,
    SignatureIdsResponse, StatsResponse,
};
use crate::repository::{MemoryRepository, NewPetition, PetitionRepository};
use crate::response::{build_error_response, uncached_json};

/// Categories every fresh repository starts with.
pub const DEFAULT_CATEGORIES: [&str; 5] = [
    "Environment",
    "Education",
    "Health",
    "Transport",
    "Housing",
];

/// Application state shared across all handlers.
///
/// The cache store is passed in explicitly so tests can swap in a fake
/// backend and a manual clock.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CacheStore>,
    pub responses: Arc<ResponseCache>,
    pub invalidator: Arc<InvalidationBroadcaster>,
    pub repo: Arc<dyn PetitionRepository>,
    pub ttls: EndpointTtls,
}

impl AppState {
    /// Wires the cache layer around `store` and `repo`.
    pub fn new(
        store: Arc<dyn CacheStore>,
        clock: Arc<dyn Clock>,
        repo: Arc<dyn PetitionRepository>,
        ttls: EndpointTtls,
        store_timeout: Duration,
    ) -> Self {
        let stats = Arc::new(CacheStats::new());
        Self {
            responses: Arc::new(ResponseCache::new(
                store.clone(),
                clock,
                stats.clone(),
                store_timeout,
            )),
            invalidator: Arc::new(InvalidationBroadcaster::new(
                store.clone(),
                stats,
                store_timeout,
            )),
            store,
            repo,
            ttls,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Returns the memory store as well so the caller can run the purge task on it.
    pub fn from_config(config: &Config) -> (Self, Arc<MemoryStore>) {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let store = Arc::new(MemoryStore::new(config.max_entries, clock.clone()));
        let repo = Arc::new(MemoryRepository::with_categories(DEFAULT_CATEGORIES));
        let state = Self::new(
            store.clone(),
            clock,
            repo,
            config.ttls,
            config.store_timeout(),
        );
        (state, store)
    }
}

// == Cached Reads ==

/// Handler for GET /petitions
pub async fn list_petitions_handler(
    State(state): State<AppState>,
    request: CacheRequest,
) -> Response {
    let params = ListParams::from_request(&request);
    let repo = state.repo.clone();
    state
        .responses
        .handle(&request, state.ttls.petitions, move || async move {
            let ListParams(query) = params?;
            Ok(repo.list_petitions(&query).await?)
        })
        .await
}

/// Handler for GET /petitions/:id
pub async fn get_petition_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: CacheRequest,
) -> Response {
    let repo = state.repo.clone();
    state
        .responses
        .handle(&request, state.ttls.petition, move || async move {
            let id: u64 = parse_number(&id, "id")?;
            Ok(repo.petition_by_id(id).await?)
        })
        .await
}

/// Handler for GET /petition/:slug
pub async fn get_petition_by_slug_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    request: CacheRequest,
) -> Response {
    let repo = state.repo.clone();
    state
        .responses
        .handle(&request, state.ttls.petition, move || async move {
            Ok(repo.petition_by_slug(&slug).await?)
        })
        .await
}

/// Handler for GET /categories
pub async fn list_categories_handler(
    State(state): State<AppState>,
    request: CacheRequest,
) -> Response {
    let repo = state.repo.clone();
    state
        .responses
        .handle(&request, state.ttls.categories, move || async move {
            Ok(repo.list_categories().await?)
        })
        .await
}

/// Handler for GET /users/:user_id/signatures
pub async fn user_signatures_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    request: CacheRequest,
) -> Response {
    let repo = state.repo.clone();
    state
        .responses
        .handle(&request, state.ttls.user_signatures, move || async move {
            Ok(repo.signatures_for_user(&user_id).await?)
        })
        .await
}

/// Handler for GET /users/:user_id/signatures/ids
pub async fn user_signature_ids_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    request: CacheRequest,
) -> Response {
    let repo = state.repo.clone();
    state
        .responses
        .handle(&request, state.ttls.user_signatures, move || async move {
            let petition_ids = repo
                .signatures_for_user(&user_id)
                .await?
                .into_iter()
                .map(|signature| signature.petition_id)
                .collect();
            Ok(SignatureIdsResponse {
                user_id,
                petition_ids,
            })
        })
        .await
}

// == Writes ==

/// Handler for POST /petitions
///
/// Creates a draft and invalidates the petition listings.
pub async fn create_petition_handler(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    payload: Result<Json<CreatePetitionRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(req) = payload.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::Validation(error_msg));
    }

    let petition = state
        .repo
        .create_petition(NewPetition {
            title: req.title.trim().to_string(),
            description: req.description,
            category_id: req.category_id,
            created_by: user_id,
        })
        .await?;

    state
        .invalidator
        .invalidate_prefix(&CachePrefix::namespace(CacheNamespace::Petitions))
        .await;

    Ok(uncached_json(StatusCode::CREATED, &petition))
}

/// Handler for POST /petitions/:id/publish
///
/// Invalidates listings and every petition detail entry.
pub async fn publish_petition_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let id: u64 = parse_number(&id, "id")?;
    let petition = state.repo.publish_petition(id).await?;

    state
        .invalidator
        .invalidate_all(&[
            CachePrefix::namespace(CacheNamespace::Petitions),
            CachePrefix::namespace(CacheNamespace::Petition),
        ])
        .await;

    Ok(uncached_json(StatusCode::OK, &petition))
}

/// Handler for POST /signatures
///
/// The duplicate check runs in the repository. On success the signer's
/// signature lists and the petition's detail entries are invalidated.
pub async fn create_signature_handler(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    payload: Result<Json<SignRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(req) = payload.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;

    // Looked up before the write: a stored signature always reaches invalidation
    let petition = state.repo.petition_by_id(req.petition_id).await?;
    let signature = state
        .repo
        .create_signature(req.petition_id, &user_id)
        .await?;

    state
        .invalidator
        .invalidate_all(&[
            CachePrefix::resource(CacheNamespace::UserSignatures, &user_id),
            CachePrefix::resource(CacheNamespace::Petition, &petition.id.to_string()),
            CachePrefix::resource(CacheNamespace::Petition, &petition.slug),
        ])
        .await;

    Ok(uncached_json(StatusCode::CREATED, &signature))
}

// == Service ==

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Response {
    // Occupancy is informational; a failing store reports zeros
    let usage = state.store.usage().await.unwrap_or_default();
    let stats = StatsResponse::new(
        state.responses.stats().snapshot(),
        usage.evictions,
        usage.entries,
    );
    uncached_json(StatusCode::OK, &stats)
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Fallback for unknown routes.
pub async fn not_found_handler() -> Response {
    build_error_response(
        ApiError::NotFound("Route not found".to_string()),
        StatusCode::NOT_FOUND,
    )
}
