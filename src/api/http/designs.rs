use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    app::state::AppState,
    auth::middleware::AuthUser,
    dto::designs::{
        CreateDesignRequest, DesignListResponse, DesignResponse, ListDesignsQuery,
        UpdateDesignRequest,
    },
    error::AppError,
    usecases::designs::DesignService,
};

pub async fn create_design_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(req): Json<CreateDesignRequest>,
) -> Result<(StatusCode, Json<DesignResponse>), AppError> {
    let response = DesignService::create_design(&state.db, auth_user.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn list_designs_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<ListDesignsQuery>,
) -> Result<Json<DesignListResponse>, AppError> {
    let response = DesignService::list_designs(&state.db, auth_user.user_id, query).await?;
    Ok(Json(response))
}

pub async fn get_design_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(design_id): Path<Uuid>,
) -> Result<Json<DesignResponse>, AppError> {
    let response = DesignService::get_design(&state.db, design_id, auth_user.user_id).await?;
    Ok(Json(response))
}

pub async fn update_design_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(design_id): Path<Uuid>,
    Json(req): Json<UpdateDesignRequest>,
) -> Result<Json<DesignResponse>, AppError> {
    let response =
        DesignService::update_design(&state.db, design_id, auth_user.user_id, req).await?;
    Ok(Json(response))
}
