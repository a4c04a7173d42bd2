//! API Module
//!
//! HTTP handlers, extractors and routing for the petition REST API.

pub mod extract;
pub mod handlers;
pub mod routes;

pub use extract::{AuthenticatedUser, BEARER_SCHEME};
pub use handlers::*;
pub use routes::create_router;
