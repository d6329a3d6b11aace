//! AbleConnect REST API.
//!
//! Axum server exposing auth, jobs, applications, content, settings, file
//! downloads, and the admin back office over the Firestore-backed
//! repositories.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod policy;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
