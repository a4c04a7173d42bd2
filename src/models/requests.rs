//! Request DTOs for the petition API
//!
//! Defines incoming bodies and query parameters, with validation.

use serde::Deserialize;

use crate::cache::CacheRequest;
use crate::error::{ApiError, ApiResult};
use crate::repository::{PetitionQuery, PetitionStatus};

/// Upper bound for `limit` on listings
pub const MAX_PAGE_SIZE: usize = 100;

/// Request body for POST /petitions
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePetitionRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category_id: Option<u64>,
}

impl CreatePetitionRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Some("Title cannot be empty".to_string());
        }
        if title.chars().count() > 200 {
            return Some("Title exceeds maximum length of 200 characters".to_string());
        }
        None
    }
}

/// Request body for POST /signatures
#[derive(Debug, Clone, Deserialize)]
pub struct SignRequest {
    pub petition_id: u64,
}

/// Query parameters for GET /petitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams(pub PetitionQuery);

impl ListParams {
    /// Reads `limit`, `offset`, `status` and `category` from the request query.
    pub fn from_request(request: &CacheRequest) -> ApiResult<Self> {
        let mut query = PetitionQuery::default();

        if let Some(raw) = request.query_value("limit") {
            query.limit = parse_number(raw, "limit")?;
            if query.limit == 0 || query.limit > MAX_PAGE_SIZE {
                return Err(ApiError::Validation(format!(
                    "limit must be between 1 and {}",
                    MAX_PAGE_SIZE
                )));
            }
        }
        if let Some(raw) = request.query_value("offset") {
            query.offset = parse_number(raw, "offset")?;
        }
        if let Some(raw) = request.query_value("status") {
            query.status = Some(
                PetitionStatus::parse(raw)
                    .ok_or_else(|| ApiError::Validation(format!("Unknown status: {}", raw)))?,
            );
        }
        if let Some(raw) = request.query_value("category") {
            query.category_id = Some(parse_number(raw, "category")?);
        }

        Ok(Self(query))
    }
}

/// Parses a numeric path or query value.
pub fn parse_number<N: std::str::FromStr>(raw: &str, name: &str) -> ApiResult<N> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::Validation(format!("{} must be a non-negative integer", name)))
}
