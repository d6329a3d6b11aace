//! Self-service profile endpoints.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use able_models::{CompanyProfile, Role};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn me(AuthUser(user): AuthUser) -> impl IntoResponse {
    Json(user)
}

/// Role-specific self-service edits. Identity fields (email, role) are not
/// editable here.
#[derive(Debug, Deserialize, Default)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    /// Jobseeker: reference to an already-uploaded resume.
    pub resume_file: Option<String>,
    /// Employer company sub-profile, replaced wholesale when present.
    pub company: Option<CompanyProfile>,
}

pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(mut user): AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<impl IntoResponse> {
    if let Some(username) = req.username {
        let trimmed = username.trim().to_string();
        if !trimmed.is_empty() {
            user.username = trimmed;
        }
    }

    if user.role == Role::Jobseeker {
        if let Some(resume) = req.resume_file {
            let superseded = user.resume_file.replace(resume);
            if let Some(old) = superseded {
                if Some(&old) != user.resume_file.as_ref() {
                    state
                        .uploads
                        .remove_best_effort(able_storage::UploadKind::Resume, &old)
                        .await;
                }
            }
        }
    }

    if user.role == Role::Employer {
        if let Some(company) = req.company {
            user.company = Some(company);
        }
    }

    state.users.update(&user).await?;

    Ok(Json(json!({
        "message": "Profile updated successfully",
        "user": user,
    })))
}
