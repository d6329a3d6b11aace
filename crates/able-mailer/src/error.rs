//! Mailer error types.

use thiserror::Error;

pub type MailerResult<T> = Result<T, MailerError>;

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("Mailer not configured: {0}")]
    ConfigError(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(#[from] lettre::address::AddressError),

    #[error("Failed to build message: {0}")]
    BuildFailed(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

impl MailerError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
