//! SMTP mailer.
//!
//! All sends are best-effort from the caller's point of view: handlers use
//! [`Mailer::send_best_effort`], which logs failures and never propagates
//! them into the request path. When SMTP is not configured the mailer runs
//! in disabled mode and logs what it would have sent.

use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info, warn};

use crate::error::{MailerError, MailerResult};

#[derive(Debug, Clone)]
pub struct MailerConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

impl MailerConfig {
    /// Read SMTP settings from the environment. Returns None when SMTP_HOST
    /// is unset, which puts the mailer in disabled mode.
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(587),
            username: std::env::var("SMTP_USERNAME").unwrap_or_default(),
            password: std::env::var("SMTP_PASSWORD").unwrap_or_default(),
            from: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| "no-reply@ableconnect.example".to_string()),
        })
    }
}

enum Transport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    Disabled,
}

pub struct Mailer {
    transport: Transport,
    from: Mailbox,
}

impl Mailer {
    pub fn new(config: MailerConfig) -> MailerResult<Self> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| MailerError::config_error(format!("SMTP_FROM invalid: {}", e)))?;

        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
                .port(config.smtp_port);
        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(config.username, config.password));
        }

        Ok(Self {
            transport: Transport::Smtp(builder.build()),
            from,
        })
    }

    /// Mailer that drops everything. Used when SMTP is not configured and
    /// in tests.
    pub fn disabled() -> Self {
        Self {
            transport: Transport::Disabled,
            from: Mailbox::new(None, "no-reply@ableconnect.example".parse().unwrap()),
        }
    }

    pub fn from_env() -> MailerResult<Self> {
        match MailerConfig::from_env() {
            Some(config) => Self::new(config),
            None => {
                info!("SMTP_HOST not set, email notifications disabled");
                Ok(Self::disabled())
            }
        }
    }

    /// Send an HTML email, returning any failure to the caller.
    pub async fn send_html(&self, to: &str, subject: &str, html_body: &str) -> MailerResult<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())?;

        match &self.transport {
            Transport::Smtp(transport) => {
                transport.send(message).await?;
                debug!(to = %to, subject = %subject, "sent email");
                Ok(())
            }
            Transport::Disabled => {
                debug!(to = %to, subject = %subject, "mailer disabled, dropping email");
                Ok(())
            }
        }
    }

    /// Send an HTML email; log and swallow any failure.
    pub async fn send_best_effort(&self, to: &str, subject: &str, html_body: &str) {
        if let Err(e) = self.send_html(to, subject, html_body).await {
            warn!(to = %to, subject = %subject, "email send failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_mailer_accepts_sends() {
        let mailer = Mailer::disabled();
        mailer
            .send_html("sam@example.com", "Hello", "<p>hi</p>")
            .await
            .unwrap();
        mailer.send_best_effort("sam@example.com", "Hello", "<p>hi</p>").await;
    }

    #[tokio::test]
    async fn invalid_recipient_is_an_error_but_swallowed_by_best_effort() {
        let mailer = Mailer::disabled();
        assert!(mailer.send_html("not-an-address", "s", "b").await.is_err());
        // must not panic or propagate
        mailer.send_best_effort("not-an-address", "s", "b").await;
    }
}
