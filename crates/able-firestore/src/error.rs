//! Firestore error types.

use thiserror::Error;

/// Result type for Firestore operations.
pub type FirestoreResult<T> = Result<T, FirestoreError>;

/// Errors that can occur during Firestore operations.
#[derive(Debug, Error)]
pub enum FirestoreError {
    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Document already exists: {0}")]
    AlreadyExists(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Server error ({0}): {1}")]
    ServerError(u16, String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rate limited, retry after {0}ms")]
    RateLimited(u64),

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FirestoreError {
    pub fn auth_error(msg: impl Into<String>) -> Self {
        Self::AuthError(msg.into())
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }

    /// Map an HTTP status to the matching error variant.
    pub fn from_http_status(status: u16, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        match status {
            404 => Self::NotFound(detail),
            409 => Self::AlreadyExists(detail),
            403 => Self::PermissionDenied(detail),
            412 => Self::PreconditionFailed(detail),
            429 => Self::RateLimited(1000),
            500..=599 => Self::ServerError(status, detail),
            _ => Self::RequestFailed(detail),
        }
    }

    /// The HTTP status this error maps back to, if it came from one.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::NotFound(_) => Some(404),
            Self::AlreadyExists(_) => Some(409),
            Self::PermissionDenied(_) => Some(403),
            Self::PreconditionFailed(_) => Some(412),
            Self::RateLimited(_) => Some(429),
            Self::ServerError(status, _) => Some(*status),
            _ => None,
        }
    }

    /// Check if error is retryable at the transport layer.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::RateLimited(_) | Self::ServerError(_, _)
        )
    }

    /// Delay hint from a 429, if any.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            Self::RateLimited(ms) => Some(*ms),
            _ => None,
        }
    }

    /// True if the error was caused by a failed write precondition.
    pub fn is_precondition_failed(&self) -> bool {
        matches!(self, Self::PreconditionFailed(_))
            || matches!(
                self,
                Self::RequestFailed(msg) if msg.contains("FAILED_PRECONDITION")
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_covers_the_interesting_codes() {
        assert!(matches!(
            FirestoreError::from_http_status(404, "x"),
            FirestoreError::NotFound(_)
        ));
        assert!(matches!(
            FirestoreError::from_http_status(409, "x"),
            FirestoreError::AlreadyExists(_)
        ));
        assert!(matches!(
            FirestoreError::from_http_status(429, "x"),
            FirestoreError::RateLimited(_)
        ));
        assert!(matches!(
            FirestoreError::from_http_status(503, "x"),
            FirestoreError::ServerError(503, _)
        ));
        assert!(matches!(
            FirestoreError::from_http_status(400, "x"),
            FirestoreError::RequestFailed(_)
        ));
    }

    #[test]
    fn retryability_follows_transport_semantics() {
        assert!(FirestoreError::from_http_status(500, "x").is_retryable());
        assert!(FirestoreError::from_http_status(429, "x").is_retryable());
        assert!(!FirestoreError::from_http_status(404, "x").is_retryable());
        assert!(!FirestoreError::from_http_status(409, "x").is_retryable());
    }

    #[test]
    fn retry_after_only_for_rate_limits() {
        assert_eq!(FirestoreError::RateLimited(2500).retry_after_ms(), Some(2500));
        assert_eq!(
            FirestoreError::ServerError(500, "x".into()).retry_after_ms(),
            None
        );
    }
}
