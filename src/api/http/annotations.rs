use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    app::state::AppState,
    auth::middleware::AuthUser,
    dto::annotations::{
        AnnotationAction, AnnotationListResponse, AnnotationResponse, CreateAnnotationRequest,
        ListAnnotationsQuery,
    },
    error::AppError,
    usecases::annotations::AnnotationService,
};

pub async fn list_annotations_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(design_id): Path<Uuid>,
    Query(query): Query<ListAnnotationsQuery>,
) -> Result<Json<AnnotationListResponse>, AppError> {
    let response =
        AnnotationService::list_annotations(&state.db, design_id, auth_user.user_id, query)
            .await?;
    Ok(Json(response))
}

pub async fn create_annotation_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(design_id): Path<Uuid>,
    Json(req): Json<CreateAnnotationRequest>,
) -> Result<(StatusCode, Json<AnnotationResponse>), AppError> {
    let response =
        AnnotationService::create_annotation(&state.db, design_id, auth_user.user_id, req)
            .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_annotation_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(annotation_id): Path<Uuid>,
) -> Result<Json<AnnotationResponse>, AppError> {
    let response =
        AnnotationService::get_annotation(&state.db, annotation_id, auth_user.user_id).await?;
    Ok(Json(response))
}

/// `PATCH /annotations/{id}` with `{"action": "reply" | "resolve" | "reopen" | "edit", ...}`.
pub async fn update_annotation_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(annotation_id): Path<Uuid>,
    Json(action): Json<AnnotationAction>,
) -> Result<Json<AnnotationResponse>, AppError> {
    let response =
        AnnotationService::apply_action(&state.db, annotation_id, auth_user.user_id, action)
            .await?;
    Ok(Json(response))
}
