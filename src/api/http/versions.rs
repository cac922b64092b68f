use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    app::state::AppState,
    auth::middleware::AuthUser,
    dto::versions::{PublishVersionRequest, PublishVersionResponse, VersionListResponse},
    error::AppError,
    usecases::versions::VersionService,
};

pub async fn publish_version_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(design_id): Path<Uuid>,
    Json(req): Json<PublishVersionRequest>,
) -> Result<(StatusCode, Json<PublishVersionResponse>), AppError> {
    let response =
        VersionService::publish_version(&state.db, design_id, auth_user.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn list_versions_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(design_id): Path<Uuid>,
) -> Result<Json<VersionListResponse>, AppError> {
    let response = VersionService::list_versions(&state.db, design_id, auth_user.user_id).await?;
    Ok(Json(response))
}
