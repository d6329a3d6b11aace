//! Per-user settings endpoints.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use able_models::UserSettings;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn get_settings(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<impl IntoResponse> {
    let settings = state.settings.get_or_default(&user.id).await?;
    Ok(Json(settings))
}

/// Full replace. The stored user id is always the caller's, whatever the
/// body claims.
pub async fn put_settings(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(mut settings): Json<UserSettings>,
) -> ApiResult<impl IntoResponse> {
    settings.user_id = user.id.clone();
    state.settings.upsert(&settings).await?;
    Ok(Json(settings))
}
