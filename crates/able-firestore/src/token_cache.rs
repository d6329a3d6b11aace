//! Cached service-account tokens for the Firestore REST API.
//!
//! A token is refreshed a minute before it expires, refreshes are
//! single-flight, and a still-usable stale token is served when the
//! refresh itself fails.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use gcp_auth::TokenProvider;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{FirestoreError, FirestoreResult};

/// Refresh this long before the token actually expires.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// TTL assumed when the provider does not report an expiry.
const FALLBACK_TTL: Duration = Duration::from_secs(50 * 60);

/// OAuth scope covering the Firestore REST API.
pub const FIRESTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn fresh(&self) -> bool {
        Instant::now() + REFRESH_MARGIN < self.expires_at
    }

    /// Past the refresh margin but not yet expired.
    fn usable(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Thread-safe token cache with single-flight refresh.
pub struct TokenCache {
    provider: Arc<dyn TokenProvider>,
    cache: RwLock<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new(provider: Arc<dyn TokenProvider>) -> Self {
        Self {
            provider,
            cache: RwLock::new(None),
        }
    }

    /// Drop the cached token, forcing a refresh on the next request.
    /// Called when Firestore rejects a request with 401.
    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
    }

    /// Get a valid access token, refreshing if necessary.
    pub async fn get_token(&self) -> FirestoreResult<String> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.fresh() {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        let mut cache = self.cache.write().await;

        // Another task may have refreshed while we waited on the write lock.
        if let Some(cached) = cache.as_ref() {
            if cached.fresh() {
                return Ok(cached.access_token.clone());
            }
        }

        self.refresh(&mut cache).await
    }

    async fn refresh(&self, cache: &mut Option<CachedToken>) -> FirestoreResult<String> {
        match self.provider.token(&[FIRESTORE_SCOPE]).await {
            Ok(token) => {
                let access_token = token.as_str().to_string();

                let expires_at = {
                    let now = Utc::now();
                    let exp = token.expires_at();
                    if exp > now {
                        match (exp - now).to_std() {
                            Ok(ttl) => Instant::now() + ttl,
                            Err(_) => Instant::now() + FALLBACK_TTL,
                        }
                    } else {
                        // Provider handed us an already-expired token; make the
                        // next request refresh again.
                        Instant::now()
                    }
                };

                *cache = Some(CachedToken {
                    access_token: access_token.clone(),
                    expires_at,
                });

                debug!("refreshed Firestore auth token");
                Ok(access_token)
            }
            Err(e) => {
                if let Some(cached) = cache.as_ref() {
                    if cached.usable() {
                        warn!("token refresh failed, serving previous token: {}", e);
                        return Ok(cached.access_token.clone());
                    }
                }
                Err(FirestoreError::auth_error(format!(
                    "Failed to obtain auth token: {}",
                    e
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_margin_is_one_minute() {
        assert_eq!(REFRESH_MARGIN, Duration::from_secs(60));
    }

    #[test]
    fn scope_targets_datastore() {
        assert!(FIRESTORE_SCOPE.contains("datastore"));
    }

    #[test]
    fn token_just_inside_margin_is_not_fresh() {
        let cached = CachedToken {
            access_token: "t".to_string(),
            expires_at: Instant::now() + Duration::from_secs(30),
        };
        assert!(!cached.fresh());
        assert!(cached.usable());
    }
}
