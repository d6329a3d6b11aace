//! Public site content.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use able_models::ContentCategory;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize, Default)]
pub struct ContentQuery {
    pub category: Option<String>,
}

/// Published items only. No auth; this backs the public site.
pub async fn list_content(
    State(state): State<AppState>,
    Query(query): Query<ContentQuery>,
) -> ApiResult<impl IntoResponse> {
    let category = query
        .category
        .as_deref()
        .filter(|c| !c.is_empty())
        .map(ContentCategory::from_str_or_default);

    let mut items = state.content.list_published(category).await?;
    items.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    Ok(Json(items))
}

pub async fn get_content(
    State(state): State<AppState>,
    Path(content_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let item = state
        .content
        .get(&content_id)
        .await?
        .filter(|c| c.published)
        .ok_or_else(|| ApiError::not_found("Content not found"))?;
    Ok(Json(item))
}
