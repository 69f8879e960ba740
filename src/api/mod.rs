//! API module
//!
//! HTTP endpoints. Authentication and rate limiting live in front of this
//! service; bodies are validated here before reaching the core.

pub mod routes;

pub use routes::{create_router, AppState};
