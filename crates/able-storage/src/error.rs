//! Storage error types.

use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to configure upload store: {0}")]
    ConfigError(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("File too large: {actual} bytes exceeds the {limit} byte limit")]
    TooLarge { actual: usize, limit: usize },

    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    pub fn invalid_filename(name: impl Into<String>) -> Self {
        Self::InvalidFilename(name.into())
    }

    /// Rejections the caller should surface as a 400 rather than a 500.
    pub fn is_client_fault(&self) -> bool {
        matches!(
            self,
            Self::TooLarge { .. } | Self::UnsupportedType(_) | Self::InvalidFilename(_)
        )
    }
}
