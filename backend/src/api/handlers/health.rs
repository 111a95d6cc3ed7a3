//! Health check endpoints.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::api::SharedState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub service: String,
    pub version: String,
    /// Storage backend in use (`git` or `filesystem`)
    pub backend: String,
    /// Deployment environment, when configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
}

/// Liveness check
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse),
    ),
)]
pub async fn health_check(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "alive".to_string(),
        timestamp: Utc::now(),
        service: "asset-library".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: state.assets.store().backend_name().to_string(),
        environment: Some(state.config.environment.clone()).filter(|e| !e.is_empty()),
    })
}

#[derive(OpenApi)]
#[openapi(paths(health_check), components(schemas(HealthResponse)))]
pub struct HealthApiDoc;
