use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, patch},
};
use tower_http::cors::CorsLayer;

use crate::{
    api::http::{
        annotations as annotations_http, approvals as approvals_http,
        collaborations as collaborations_http, designs as designs_http, health as health_http,
        versions as versions_http,
    },
    app::{middleware::security_headers, state::AppState},
    auth::{middleware::auth_middleware, rate_limit::rate_limit_middleware},
    telemetry::request_logging_middleware,
};

pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let mut cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);
    match cors_origin.parse::<HeaderValue>() {
        Ok(origin) => cors = cors.allow_origin(origin),
        Err(_) => tracing::warn!(%cors_origin, "Ignoring invalid CORS origin"),
    }

    let public_routes = Router::new()
        .route("/health", get(health_http::health_handle))
        .route("/health/ready", get(health_http::readiness_handle));

    let api_routes = Router::new()
        .route(
            "/designs",
            get(designs_http::list_designs_handle).post(designs_http::create_design_handle),
        )
        .route(
            "/designs/{design_id}",
            get(designs_http::get_design_handle).patch(designs_http::update_design_handle),
        )
        .route(
            "/designs/{design_id}/versions",
            get(versions_http::list_versions_handle).post(versions_http::publish_version_handle),
        )
        .route(
            "/designs/{design_id}/annotations",
            get(annotations_http::list_annotations_handle)
                .post(annotations_http::create_annotation_handle),
        )
        .route(
            "/annotations/{annotation_id}",
            get(annotations_http::get_annotation_handle)
                .patch(annotations_http::update_annotation_handle),
        )
        .route(
            "/designs/{design_id}/approvals",
            get(approvals_http::list_approvals_handle)
                .post(approvals_http::submit_approval_handle),
        )
        .route(
            "/designs/{design_id}/approvals/history",
            get(approvals_http::approval_history_handle),
        )
        .route(
            "/designs/{design_id}/collaborators",
            get(collaborations_http::list_collaborators_handle)
                .post(collaborations_http::add_collaborator_handle),
        )
        .route(
            "/designs/{design_id}/collaborators/{user_id}",
            patch(collaborations_http::update_collaborator_handle),
        )
        // Layer order matters: rate limiting runs before auth.
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(cors)
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_logging_middleware))
        .with_state(state)
}
