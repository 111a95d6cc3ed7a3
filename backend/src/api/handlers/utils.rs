//! Test-data utilities and repository status.

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, OpenApi, ToSchema};

use super::parse_number;
use crate::api::SharedState;
use crate::error::{AppError, Result};
use crate::services::asset_service::AssetRef;
use crate::services::fixture_service;
use crate::storage::{ChangedFile, RepositoryStatus, Revision};

pub const DEFAULT_GENERATE_COUNT: usize = 10;
pub const MAX_GENERATE_COUNT: usize = 1000;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/utils/generate", post(generate))
        .route("/utils/cleanup", post(cleanup))
        .route("/utils/git-status", get(git_status))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GenerateParams {
    /// Number of assets to create (default 10)
    pub count: Option<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UtilityResponse {
    pub message: String,
    pub assets: Vec<AssetRef>,
}

/// Generate random test assets
#[utoipa::path(
    post,
    path = "/utils/generate",
    tag = "utils",
    params(GenerateParams),
    responses(
        (status = 200, description = "Generated assets", body = UtilityResponse),
        (status = 400, description = "Invalid count", body = crate::api::openapi::ErrorResponse),
    )
)]
pub async fn generate(
    State(state): State<SharedState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<UtilityResponse>> {
    let count = parse_number(&pairs, "count")?.unwrap_or(DEFAULT_GENERATE_COUNT);
    if count == 0 || count > MAX_GENERATE_COUNT {
        return Err(AppError::Validation(format!(
            "count must be between 1 and {}",
            MAX_GENERATE_COUNT
        )));
    }

    let generated = fixture_service::generate_assets(count, &mut rand::rng());
    let message = format!("Generated {} test assets", generated.len());
    state.assets.insert_all(&generated, &message).await?;

    Ok(Json(UtilityResponse {
        message,
        assets: generated.iter().map(AssetRef::from).collect(),
    }))
}

/// Remove test-tagged and test-authored assets
#[utoipa::path(
    post,
    path = "/utils/cleanup",
    tag = "utils",
    responses(
        (status = 200, description = "Removed assets", body = UtilityResponse),
    )
)]
pub async fn cleanup(State(state): State<SharedState>) -> Result<Json<UtilityResponse>> {
    let removed = state
        .assets
        .remove_matching(fixture_service::is_test_asset, "Cleaned up test assets")
        .await?;
    Ok(Json(UtilityResponse {
        message: format!("Removed {} test assets", removed.len()),
        assets: removed,
    }))
}

/// Working-tree status of the library repository
#[utoipa::path(
    get,
    path = "/utils/git-status",
    tag = "utils",
    responses(
        (status = 200, description = "Repository status", body = RepositoryStatus),
        (status = 503, description = "Library is not Git-backed", body = crate::api::openapi::ErrorResponse),
    )
)]
pub async fn git_status(State(state): State<SharedState>) -> Result<Json<RepositoryStatus>> {
    Ok(Json(state.assets.repository_status().await?))
}

#[derive(OpenApi)]
#[openapi(
    paths(generate, cleanup, git_status),
    components(schemas(UtilityResponse, RepositoryStatus, ChangedFile, Revision))
)]
pub struct UtilsApiDoc;
