//! Request and Response models for the petition API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{parse_number, CreatePetitionRequest, ListParams, SignRequest, MAX_PAGE_SIZE};
pub use responses::{ErrorResponse, HealthResponse, SignatureIdsResponse, StatsResponse};
