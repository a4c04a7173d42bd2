//! Repository Module
//!
//! Data-access contract for petitions, categories and signatures, plus an
//! in-memory implementation.
//!
//! Lookups report a missing record as [`RepoError::NotFound`], distinct from
//! backend failures. Duplicate-signature checks happen here against the
//! source of truth, never against the response cache.

mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use memory::MemoryRepository;

// == Records ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetitionStatus {
    Draft,
    Active,
    Closed,
}

impl PetitionStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "draft" => Some(PetitionStatus::Draft),
            "active" => Some(PetitionStatus::Active),
            "closed" => Some(PetitionStatus::Closed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Petition {
    pub id: u64,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub category_id: Option<u64>,
    pub status: PetitionStatus,
    pub signature_count: u64,
    /// Opaque identifier from the identity provider
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    pub id: u64,
    pub petition_id: u64,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to create a petition.
#[derive(Debug, Clone)]
pub struct NewPetition {
    pub title: String,
    pub description: String,
    pub category_id: Option<u64>,
    pub created_by: String,
}

/// Listing filters and paging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PetitionQuery {
    pub limit: usize,
    pub offset: usize,
    pub status: Option<PetitionStatus>,
    pub category_id: Option<u64>,
}

impl Default for PetitionQuery {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
            status: None,
            category_id: None,
        }
    }
}

// == Repository Error ==
#[derive(Error, Debug)]
pub enum RepoError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("{0}")]
    Duplicate(String),

    #[error("{0}")]
    Invalid(String),

    #[error("Storage failure: {0}")]
    Backend(String),
}

pub type RepoResult<T> = std::result::Result<T, RepoError>;

// == Repository Trait ==
#[async_trait]
pub trait PetitionRepository: Send + Sync {
    /// Petitions matching `query`, newest first.
    async fn list_petitions(&self, query: &PetitionQuery) -> RepoResult<Vec<Petition>>;

    async fn petition_by_id(&self, id: u64) -> RepoResult<Petition>;

    async fn petition_by_slug(&self, slug: &str) -> RepoResult<Petition>;

    /// Creates a draft with a unique slug derived from the title.
    async fn create_petition(&self, new: NewPetition) -> RepoResult<Petition>;

    /// Moves a draft to active.
    async fn publish_petition(&self, id: u64) -> RepoResult<Petition>;

    async fn list_categories(&self) -> RepoResult<Vec<Category>>;

    async fn signatures_for_user(&self, user_id: &str) -> RepoResult<Vec<Signature>>;

    /// Records a signature on an active petition.
    ///
    /// Fails with [`RepoError::Duplicate`] if the user already signed it.
    async fn create_signature(&self, petition_id: u64, user_id: &str) -> RepoResult<Signature>;
}
