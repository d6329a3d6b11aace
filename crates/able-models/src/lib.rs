//! Shared data models for the AbleConnect backend.
//!
//! This crate provides Serde-serializable types for:
//! - Users, roles, and employer company profiles
//! - Job postings and their moderation status
//! - Applications and the application status workflow
//! - Admin-authored content
//! - Per-user accessibility settings

pub mod application;
pub mod content;
pub mod job;
pub mod settings;
pub mod user;

// Re-export common types
pub use application::{
    normalize_string_or_list, Application, ApplicationSnapshot, ApplicationStatus,
    StatusParseError,
};
pub use content::{Content, ContentCategory};
pub use job::{Job, JobStatus, JobType};
pub use settings::UserSettings;
pub use user::{Accommodation, CompanyProfile, Role, User};
