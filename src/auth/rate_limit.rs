use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use redis::AsyncCommands;

use crate::{app::state::AppState, error::AppError};

const WINDOW_SECS: i64 = 60;

/// Fixed one-minute window per (client ip, path), backed by Redis. Disabled
/// when Redis is not configured; Redis failures let the request through.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(client) = &state.redis else {
        return Ok(next.run(req).await);
    };

    let ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let key = rate_limit_key(&ip, req.uri().path());

    let mut conn = match client.get_multiplexed_async_connection().await {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!("Redis connection error: {}", e);
            return Ok(next.run(req).await);
        }
    };

    let count: u64 = match conn.incr(&key, 1).await {
        Ok(count) => count,
        Err(e) => {
            tracing::error!("Redis incr error: {}", e);
            return Ok(next.run(req).await);
        }
    };

    if count == 1 {
        if let Err(e) = conn.expire::<_, ()>(&key, WINDOW_SECS).await {
            tracing::error!("Redis expire error: {}", e);
        }
    }

    if is_over_limit(count, state.rate_limit_per_minute) {
        tracing::warn!(%ip, path = %req.uri().path(), count, "Rate limit exceeded");
        return Err(AppError::TooManyRequests(
            "Too many requests, try again later".to_string(),
        ));
    }

    Ok(next.run(req).await)
}

fn rate_limit_key(ip: &str, path: &str) -> String {
    format!("design_review:rate_limit:{}:{}", path, ip)
}

fn is_over_limit(count: u64, limit: u64) -> bool {
    limit > 0 && count > limit
}
