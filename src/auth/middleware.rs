use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{app::state::AppState, error::AppError};

#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
}

/// Verifies the `Authorization: Bearer` token and stores the caller as an
/// `AuthUser` extension.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|val| val.strip_prefix("Bearer "))
        .map(str::to_string)
        .ok_or(AppError::Unauthorized(
            "Missing authorization token".to_string(),
        ))?;

    let claims = state
        .jwt_config
        .verify_token(&token)
        .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid user id in token".to_string()))?;

    tracing::Span::current().record("user_id", tracing::field::display(user_id));
    req.extensions_mut().insert(AuthUser { user_id });

    Ok(next.run(req).await)
}
