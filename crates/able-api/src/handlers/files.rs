//! Download endpoints for uploaded application files.

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use serde::Deserialize;

use able_storage::{mime_for, UploadKind};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize, Default)]
pub struct DownloadQuery {
    /// `view=true` renders inline (browser preview) instead of downloading.
    #[serde(default)]
    pub view: bool,
}

pub async fn download_resume(
    state: State<AppState>,
    user: AuthUser,
    path: Path<String>,
    query: Query<DownloadQuery>,
) -> ApiResult<impl IntoResponse> {
    serve(state, user, UploadKind::Resume, path, query).await
}

pub async fn download_certificate(
    state: State<AppState>,
    user: AuthUser,
    path: Path<String>,
    query: Query<DownloadQuery>,
) -> ApiResult<impl IntoResponse> {
    serve(state, user, UploadKind::Certificate, path, query).await
}

async fn serve(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    kind: UploadKind,
    Path(filename): Path<String>,
    Query(query): Query<DownloadQuery>,
) -> ApiResult<impl IntoResponse> {
    let bytes = state.uploads.read(kind, &filename).await?;

    let disposition = if query.view {
        format!("inline; filename=\"{}\"", filename)
    } else {
        format!("attachment; filename=\"{}\"", filename)
    };

    Ok((
        [
            (header::CONTENT_TYPE, mime_for(&filename).to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}
