//! Bearer-token authentication.
//!
//! HS256 tokens carry the user id and role; every protected route resolves
//! the token to a live user record so suspensions and deletions take effect
//! immediately. Passwords are bcrypt-hashed; password-reset tokens are
//! random, single-use, and expire after one hour.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

use able_models::{Role, User};

use crate::error::ApiError;
use crate::state::AppState;

/// Reset tokens live for one hour.
pub const RESET_TOKEN_TTL: Duration = Duration::hours(1);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issue a bearer token for a user.
pub fn issue_token(user: &User, secret: &str, expiry_hours: i64) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id.clone(),
        role: user.role.as_str().to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(expiry_hours)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::internal(format!("token encoding failed: {}", e)))
}

/// Verify a bearer token and return its claims.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, ApiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::unauthorized("Invalid or expired token"))
}

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| ApiError::internal(format!("password hashing failed: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// Random token for password-reset links.
pub fn generate_reset_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect()
}

fn bearer_token(parts: &Parts) -> Result<String, ApiError> {
    parts
        .headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
        .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))
}

/// The authenticated caller, resolved to a live user record.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = verify_token(&token, &state.config.jwt_secret)?;

        let user = state
            .users
            .get(&claims.sub)
            .await?
            .ok_or_else(|| ApiError::unauthorized("Account no longer exists"))?;

        if user.suspended {
            return Err(ApiError::forbidden("Account suspended"));
        }

        Ok(AuthUser(user))
    }
}

/// An authenticated caller who must be an admin. All `/admin` routes take
/// this extractor instead of re-checking the role inline.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if user.role != Role::Admin {
            return Err(ApiError::forbidden("You are not authorized"));
        }
        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user(role: Role) -> User {
        User::new("u1", "sam", "sam@test", "hash", role)
    }

    #[test]
    fn token_round_trip() {
        let user = test_user(Role::Employer);
        let token = issue_token(&user, "secret", 24).unwrap();
        let claims = verify_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.role, "employer");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let user = test_user(Role::Jobseeker);
        let token = issue_token(&user, "secret", 24).unwrap();
        assert!(verify_token(&token, "other-secret").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let user = test_user(Role::Jobseeker);
        let token = issue_token(&user, "secret", -1).unwrap();
        assert!(verify_token(&token, "secret").is_err());
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
        assert!(!verify_password("hunter2", "not-a-bcrypt-hash"));
    }

    #[test]
    fn reset_tokens_are_long_and_distinct() {
        let a = generate_reset_token();
        let b = generate_reset_token();
        assert_eq!(a.len(), 48);
        assert_ne!(a, b);
    }
}
