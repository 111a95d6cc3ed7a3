//! Batch import, batch checkout and export.

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

use super::{parse_filter, AppliedFilters, FilterParams};
use crate::api::extract::ApiJson;
use crate::api::SharedState;
use crate::error::{AppError, Result};
use crate::models::asset::{Asset, NewAsset};
use crate::services::asset_service::{
    AssetRef, BatchCheckoutReport, BatchImportReport, CheckoutFailure, ImportFailure,
};

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/batch/import", post(batch_import))
        .route("/batch/checkout", post(batch_checkout))
        .route("/export", get(export))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BatchImportRequest {
    #[serde(default)]
    pub assets: Vec<NewAsset>,
}

/// Import many assets; invalid entries are skipped and reported
#[utoipa::path(
    post,
    path = "/batch/import",
    tag = "batch",
    request_body = BatchImportRequest,
    responses(
        (status = 200, description = "Import report", body = BatchImportReport),
        (status = 400, description = "No assets provided", body = crate::api::openapi::ErrorResponse),
    )
)]
pub async fn batch_import(
    State(state): State<SharedState>,
    ApiJson(payload): ApiJson<BatchImportRequest>,
) -> Result<Json<BatchImportReport>> {
    Ok(Json(state.assets.batch_import(payload.assets).await?))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BatchCheckoutRequest {
    #[serde(default)]
    pub asset_ids: Vec<String>,
    pub borrower: Option<String>,
    pub game_context: Option<String>,
}

/// Check out many assets to one borrower; failures are reported per asset
#[utoipa::path(
    post,
    path = "/batch/checkout",
    tag = "batch",
    request_body = BatchCheckoutRequest,
    responses(
        (status = 200, description = "Checkout report", body = BatchCheckoutReport),
        (status = 400, description = "Missing asset_ids or borrower", body = crate::api::openapi::ErrorResponse),
    )
)]
pub async fn batch_checkout(
    State(state): State<SharedState>,
    ApiJson(payload): ApiJson<BatchCheckoutRequest>,
) -> Result<Json<BatchCheckoutReport>> {
    let borrower = payload
        .borrower
        .ok_or_else(|| AppError::Validation("Missing asset_ids or borrower".to_string()))?;
    let report = state
        .assets
        .batch_checkout(payload.asset_ids, &borrower, payload.game_context)
        .await?;
    Ok(Json(report))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ExportResponse {
    pub export_timestamp: DateTime<Utc>,
    pub asset_count: usize,
    pub filters: AppliedFilters,
    /// Lending state stripped; valid `/batch/import` input
    pub assets: Vec<Asset>,
}

/// Export a filtered collection
#[utoipa::path(
    get,
    path = "/export",
    tag = "batch",
    params(FilterParams),
    responses(
        (status = 200, description = "Exported assets", body = ExportResponse),
        (status = 400, description = "Invalid filter value", body = crate::api::openapi::ErrorResponse),
    )
)]
pub async fn export(
    State(state): State<SharedState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ExportResponse>> {
    let filter = parse_filter(&pairs)?;
    let assets = state.assets.export(&filter).await?;
    Ok(Json(ExportResponse {
        export_timestamp: Utc::now(),
        asset_count: assets.len(),
        filters: AppliedFilters::from(&filter),
        assets,
    }))
}

#[derive(OpenApi)]
#[openapi(
    paths(batch_import, batch_checkout, export),
    components(schemas(
        BatchImportRequest,
        BatchImportReport,
        ImportFailure,
        BatchCheckoutRequest,
        BatchCheckoutReport,
        CheckoutFailure,
        AssetRef,
        ExportResponse
    ))
)]
pub struct BatchApiDoc;
