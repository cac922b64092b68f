use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    app::state::AppState,
    auth::middleware::AuthUser,
    dto::collaborations::{
        AddCollaboratorRequest, CollaboratorListResponse, CollaboratorResponse,
        UpdateCollaboratorRequest,
    },
    error::AppError,
    usecases::collaborations::CollaborationService,
};

pub async fn list_collaborators_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(design_id): Path<Uuid>,
) -> Result<Json<CollaboratorListResponse>, AppError> {
    let response =
        CollaborationService::list_collaborators(&state.db, design_id, auth_user.user_id).await?;
    Ok(Json(response))
}

pub async fn add_collaborator_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(design_id): Path<Uuid>,
    Json(req): Json<AddCollaboratorRequest>,
) -> Result<(StatusCode, Json<CollaboratorResponse>), AppError> {
    let response =
        CollaborationService::add_collaborator(&state.db, design_id, auth_user.user_id, req)
            .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn update_collaborator_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path((design_id, user_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateCollaboratorRequest>,
) -> Result<Json<CollaboratorResponse>, AppError> {
    let response = CollaborationService::update_collaborator(
        &state.db,
        design_id,
        user_id,
        auth_user.user_id,
        req,
    )
    .await?;
    Ok(Json(response))
}
