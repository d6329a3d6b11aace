//! Outbound email.

pub mod error;
pub mod mailer;

pub use error::{MailerError, MailerResult};
pub use mailer::{Mailer, MailerConfig};
