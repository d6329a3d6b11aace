//! Request handlers.

pub mod admin;
pub mod applications;
pub mod auth;
pub mod content;
pub mod files;
pub mod jobs;
pub mod settings;
pub mod users;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// Liveness probe.
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}
