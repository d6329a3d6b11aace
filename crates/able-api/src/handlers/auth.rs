//! Registration, login, and password reset.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use able_models::{Role, User};

use crate::auth::{
    generate_reset_token, hash_password, issue_token, verify_password, RESET_TOKEN_TTL,
};
use crate::error::{ApiError, ApiResult};
use crate::metrics::record_email_attempt;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 64, message = "Username must be 3-64 characters"))]
    pub username: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    /// Defaults to jobseeker; unknown values also fall back to jobseeker.
    #[serde(default)]
    pub role: Option<String>,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()
        .map_err(|e| ApiError::validation(flatten_validation(&e)))?;

    let role = Role::from_str_or_default(req.role.as_deref().unwrap_or("jobseeker"));

    // Usernames are unique too; raced duplicates are rare enough that the
    // lookup check suffices.
    if state.users.find_by_username(&req.username).await?.is_some() {
        return Err(ApiError::duplicate("Username is already taken"));
    }

    let user = User::new(
        Uuid::new_v4().to_string(),
        req.username.trim(),
        req.email.trim(),
        hash_password(&req.password)?,
        role,
    );

    state.users.create(&user).await.map_err(|e| {
        if matches!(e, able_firestore::FirestoreError::AlreadyExists(_)) {
            ApiError::duplicate("Email is already registered")
        } else {
            e.into()
        }
    })?;

    let token = issue_token(&user, &state.config.jwt_secret, state.config.jwt_expiry_hours)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "token": token,
            "user": user,
        })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email.
    pub identifier: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .users
        .find_by_identifier(req.identifier.trim())
        .await?;

    // Same response for unknown identifier and wrong password.
    let user = match user {
        Some(u) if verify_password(&req.password, &u.password_hash) => u,
        _ => return Err(ApiError::unauthorized("Invalid credentials")),
    };

    if user.suspended {
        return Err(ApiError::forbidden("Account suspended"));
    }

    let token = issue_token(&user, &state.config.jwt_secret, state.config.jwt_expiry_hours)?;
    info!(user_id = %user.id, "user logged in");

    Ok(Json(json!({ "token": token, "user": user })))
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Issue a reset token and email a link. The response never reveals whether
/// the email is registered.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    if let Some(user) = state.users.find_by_email(req.email.trim()).await? {
        let token = generate_reset_token();
        let expires = Utc::now() + RESET_TOKEN_TTL;
        state.users.set_reset_token(&user.id, &token, expires).await?;

        let link = format!("{}/reset-password/{}", state.config.frontend_url, token);
        let body = format!(
            "<p>Hello {},</p>\
             <p>A password reset was requested for your AbleConnect account. \
             The link below is valid for one hour.</p>\
             <p><a href=\"{}\">Reset your password</a></p>\
             <p>If you did not request this, you can ignore this email.</p>",
            user.username, link
        );
        record_email_attempt("password_reset");
        state
            .mailer
            .send_best_effort(&user.email, "Password Reset", &body)
            .await;
    }

    Ok(Json(json!({
        "message": "If that email is registered, a reset link has been sent."
    })))
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub password: String,
}

pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(req): Json<ResetPasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.password.len() < 8 {
        return Err(ApiError::validation("Password must be at least 8 characters"));
    }

    // The token alone identifies the user; scan is acceptable at this
    // collection size since tokens are rare and short-lived.
    let users = state.users.list(None).await?;
    let now = Utc::now();
    let user = users
        .into_iter()
        .find(|u| u.reset_token_valid(&token, now))
        .ok_or_else(|| ApiError::validation("Invalid or expired reset token"))?;

    state
        .users
        .consume_reset_token(&user.id, &hash_password(&req.password)?)
        .await?;
    info!(user_id = %user.id, "password reset");

    Ok(Json(json!({ "message": "Password has been reset successfully" })))
}

pub(crate) fn flatten_validation(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_request_validation() {
        let bad = RegisterRequest {
            username: "ab".to_string(),
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            role: None,
        };
        let errors = bad.validate().unwrap_err();
        let message = flatten_validation(&errors);
        assert!(message.contains("Username"));
        assert!(message.contains("email"));
        assert!(message.contains("Password"));

        let good = RegisterRequest {
            username: "samuel".to_string(),
            email: "sam@example.com".to_string(),
            password: "long-enough".to_string(),
            role: Some("employer".to_string()),
        };
        assert!(good.validate().is_ok());
    }
}
