//! Route configuration and setup

use crate::api_doc::ApiDoc;
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use warden_core::Config;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Router<()> {
    let body_limit = config.server.upload_body_limit_bytes;
    tracing::debug!(body_limit, "Request body limit configured");

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/scan", post(handlers::scan::scan_upload))
        .route("/scan-path", post(handlers::scan::scan_path))
        .route("/validate", post(handlers::validate::validate_upload))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        // Extractors enforce this and fail with 413, rendered as our JSON error.
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(setup_cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn setup_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}
