use axum::{
    Extension, Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{
    app::state::AppState,
    auth::middleware::AuthUser,
    dto::approvals::{
        ApprovalHistoryResponse, ApprovalListResponse, ApprovalResponse, SubmitApprovalRequest,
    },
    error::AppError,
    usecases::approvals::ApprovalService,
};

pub async fn submit_approval_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(design_id): Path<Uuid>,
    Json(req): Json<SubmitApprovalRequest>,
) -> Result<Json<ApprovalResponse>, AppError> {
    let response =
        ApprovalService::submit_approval(&state.db, design_id, auth_user.user_id, req).await?;
    Ok(Json(response))
}

pub async fn list_approvals_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(design_id): Path<Uuid>,
) -> Result<Json<ApprovalListResponse>, AppError> {
    let response =
        ApprovalService::list_approvals(&state.db, design_id, auth_user.user_id).await?;
    Ok(Json(response))
}

pub async fn approval_history_handle(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(design_id): Path<Uuid>,
) -> Result<Json<ApprovalHistoryResponse>, AppError> {
    let response = ApprovalService::list_history(&state.db, design_id, auth_user.user_id).await?;
    Ok(Json(response))
}
