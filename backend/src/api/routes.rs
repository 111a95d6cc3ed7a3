//! Route definitions for the API.

use axum::{extract::DefaultBodyLimit, http::Uri, middleware, routing::get, Router};
use utoipa_swagger_ui::SwaggerUi;

use super::handlers;
use super::middleware::tracing::correlation_id_middleware;
use super::SharedState;
use crate::error::AppError;

/// Request bodies are JSON documents; batch imports are the largest.
const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Create the main API router
pub fn create_router(state: SharedState) -> Router {
    // Build OpenAPI spec once at startup
    let openapi = super::openapi::build_openapi();

    Router::new()
        // Health endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/ping", get(handlers::health::health_check))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .merge(handlers::assets::router())
        .merge(handlers::search::router())
        .merge(handlers::circulation::router())
        .merge(handlers::history::router())
        .merge(handlers::batch::router())
        .merge(handlers::utils::router())
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn(correlation_id_middleware))
        .with_state(state)
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}
