//! Firestore persistence layer.
//!
//! REST client with cached service-account auth, retry, and typed
//! repositories for users (plus the email-uniqueness index), jobs,
//! applications, content, and user settings.

pub mod applications;
pub mod client;
pub mod content;
pub mod error;
pub mod jobs;
pub mod metrics;
pub mod retry;
pub mod settings;
pub mod token_cache;
pub mod types;
pub mod users;

pub use applications::ApplicationRepository;
pub use client::{FirestoreClient, FirestoreConfig};
pub use content::ContentRepository;
pub use error::{FirestoreError, FirestoreResult};
pub use jobs::JobRepository;
pub use retry::RetryConfig;
pub use settings::SettingsRepository;
pub use users::UserRepository;
