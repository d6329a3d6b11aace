//! Retry with exponential backoff and full jitter.
//!
//! Retries network failures, 429s (honoring Retry-After) and 5xx.
//! Everything else, notably 404/409/412, fails immediately.

use std::time::Duration;

use tracing::{info_span, warn, Instrument};

use crate::error::{FirestoreError, FirestoreResult};
use crate::metrics::record_retry;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 100,
            max_delay_ms: 5000,
        }
    }
}

impl RetryConfig {
    pub fn from_env() -> Self {
        let base_delay_ms = std::env::var("FIRESTORE_RETRY_BASE_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(100);

        let max_delay_ms = std::env::var("FIRESTORE_RETRY_MAX_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5000);

        Self {
            max_retries: 3,
            base_delay_ms,
            max_delay_ms,
        }
    }
}

/// Run `op`, retrying transient failures per `config`.
pub async fn with_retry<T, F, Fut>(config: &RetryConfig, operation: &str, op: F) -> FirestoreResult<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = FirestoreResult<T>>,
{
    let mut last_error = None;

    for attempt in 0..=config.max_retries {
        let span = info_span!("firestore_retry", operation = %operation, attempt = attempt + 1);
        match op().instrument(span).await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < config.max_retries => {
                let delay = backoff_delay(config, attempt, e.retry_after_ms());
                warn!(
                    operation = %operation,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    "Firestore operation failed, retrying: {}",
                    e
                );
                record_retry(operation);
                tokio::time::sleep(delay).await;
                last_error = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_error.unwrap_or_else(|| FirestoreError::request_failed("Unknown error")))
}

fn backoff_delay(config: &RetryConfig, attempt: u32, retry_after_ms: Option<u64>) -> Duration {
    // A server-provided Retry-After wins over our own schedule.
    if let Some(after) = retry_after_ms {
        return Duration::from_millis(after);
    }

    let exp = config.base_delay_ms.saturating_mul(2u64.pow(attempt));
    let capped = exp.min(config.max_delay_ms);

    // Full jitter without pulling in a RNG; sub-second clock noise is enough
    // to spread concurrent retries.
    let jittered = if capped > 0 {
        use std::time::SystemTime;
        let nanos = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.subsec_nanos())
            .unwrap_or(0);
        let factor = (nanos % 1000) as f64 / 1000.0;
        ((capped as f64) * factor) as u64
    } else {
        0
    };

    Duration::from_millis(jittered.max(config.base_delay_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.base_delay_ms, 100);
    }

    #[test]
    fn retry_after_overrides_backoff() {
        let config = RetryConfig::default();
        assert_eq!(
            backoff_delay(&config, 0, Some(2000)),
            Duration::from_millis(2000)
        );
    }

    #[test]
    fn delay_is_capped() {
        let config = RetryConfig {
            max_retries: 3,
            base_delay_ms: 1000,
            max_delay_ms: 2000,
        };
        assert!(backoff_delay(&config, 10, None).as_millis() <= 2000);
    }

    #[test]
    fn delay_never_below_base() {
        let config = RetryConfig::default();
        assert!(backoff_delay(&config, 0, None).as_millis() >= config.base_delay_ms as u128);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let config = RetryConfig {
            max_retries: 2,
            base_delay_ms: 1,
            max_delay_ms: 2,
        };
        let attempts = std::sync::atomic::AtomicU32::new(0);
        let result: FirestoreResult<()> = with_retry(&config, "test_op", || {
            attempts.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            async { Err(FirestoreError::ServerError(503, "down".to_string())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(attempts.load(std::sync::atomic::Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_conflicts() {
        let config = RetryConfig::default();
        let attempts = std::sync::atomic::AtomicU32::new(0);
        let result: FirestoreResult<()> = with_retry(&config, "test_op", || {
            attempts.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            async { Err(FirestoreError::AlreadyExists("dup".to_string())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(attempts.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
