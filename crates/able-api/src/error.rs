//! API error types.

use std::sync::atomic::{AtomicBool, Ordering};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    /// Unique-constraint or business-duplicate violations surface as 400,
    /// not 409.
    #[error("{0}")]
    Duplicate(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Storage error: {0}")]
    Storage(#[from] able_storage::StorageError),

    #[error("Firestore error: {0}")]
    Firestore(#[from] able_firestore::FirestoreError),
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn duplicate(msg: impl Into<String>) -> Self {
        Self::Duplicate(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// The message rendered to clients. Internal detail is hidden when
    /// running in production.
    fn client_message(&self, production: bool) -> String {
        if production && self.status_code() == StatusCode::INTERNAL_SERVER_ERROR {
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) | ApiError::Duplicate(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Storage(e) if e.is_client_fault() => StatusCode::BAD_REQUEST,
            ApiError::Storage(able_storage::StorageError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) | ApiError::Storage(_) | ApiError::Firestore(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

static PRODUCTION: AtomicBool = AtomicBool::new(false);

/// Record whether the process runs in production. Called once at startup
/// from the resolved config; `IntoResponse` has no access to state.
pub fn set_production(production: bool) {
    PRODUCTION.store(production, Ordering::Relaxed);
}

#[derive(Serialize)]
struct ErrorResponse {
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.client_message(PRODUCTION.load(Ordering::Relaxed));
        (status, Json(ErrorResponse { message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_expected_statuses() {
        assert_eq!(
            ApiError::validation("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::duplicate("Already applied.").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::forbidden("You are not authorized").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(ApiError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::internal("boom").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn client_fault_storage_errors_are_bad_requests() {
        let err = ApiError::Storage(able_storage::StorageError::UnsupportedType(
            "a.exe".to_string(),
        ));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = ApiError::Storage(able_storage::StorageError::NotFound("x".to_string()));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn production_masks_internal_detail_only() {
        let err = ApiError::internal("firestore exploded");
        assert_eq!(err.client_message(true), "An internal error occurred");
        assert_eq!(
            err.client_message(false),
            "Internal error: firestore exploded"
        );

        // Client-fault errors keep their message either way.
        let err = ApiError::validation("Name is required");
        assert_eq!(err.client_message(true), "Name is required");
        assert_eq!(err.client_message(false), "Name is required");
    }

    #[test]
    fn messages_surface_verbatim() {
        assert_eq!(
            ApiError::forbidden("You are not authorized").to_string(),
            "You are not authorized"
        );
        assert_eq!(
            ApiError::duplicate("Already applied.").to_string(),
            "Already applied."
        );
    }
}
