//! Asset catalogue handlers: browse, add and fetch.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use super::{parse_asset_id, parse_filter, AppliedFilters, FilterParams};
use crate::api::extract::ApiJson;
use crate::api::SharedState;
use crate::error::Result;
use crate::models::asset::{Asset, NewAsset};

/// Create asset routes
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/browse", get(browse))
        .route("/add_asset", post(add_asset))
        .route("/assets/:id", get(get_asset))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BrowseResponse {
    pub total: usize,
    pub assets: Vec<Asset>,
    pub filters: AppliedFilters,
}

/// List assets, optionally filtered
#[utoipa::path(
    get,
    path = "/browse",
    tag = "assets",
    params(FilterParams),
    responses(
        (status = 200, description = "Matching assets ordered by type and name", body = BrowseResponse),
        (status = 400, description = "Invalid filter value", body = crate::api::openapi::ErrorResponse),
    )
)]
pub async fn browse(
    State(state): State<SharedState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<BrowseResponse>> {
    let filter = parse_filter(&pairs)?;
    let assets = state.assets.list(&filter).await?;
    Ok(Json(BrowseResponse {
        total: assets.len(),
        assets,
        filters: AppliedFilters::from(&filter),
    }))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AssetCreatedResponse {
    pub message: String,
    pub asset: Asset,
}

/// Add a new asset to the library
#[utoipa::path(
    post,
    path = "/add_asset",
    tag = "assets",
    request_body = NewAsset,
    responses(
        (status = 201, description = "Asset created", body = AssetCreatedResponse),
        (status = 400, description = "Missing or invalid fields", body = crate::api::openapi::ErrorResponse),
    )
)]
pub async fn add_asset(
    State(state): State<SharedState>,
    ApiJson(payload): ApiJson<NewAsset>,
) -> Result<(StatusCode, Json<AssetCreatedResponse>)> {
    let asset = state.assets.create(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(AssetCreatedResponse {
            message: "Asset added successfully".to_string(),
            asset,
        }),
    ))
}

/// Get an asset by ID
#[utoipa::path(
    get,
    path = "/assets/{id}",
    tag = "assets",
    params(("id" = uuid::Uuid, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Asset document", body = Asset),
        (status = 404, description = "Asset not found", body = crate::api::openapi::ErrorResponse),
    )
)]
pub async fn get_asset(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Asset>> {
    let id = parse_asset_id(&id)?;
    Ok(Json(state.assets.get(id).await?))
}

#[derive(OpenApi)]
#[openapi(
    paths(browse, add_asset, get_asset),
    components(schemas(Asset, NewAsset, BrowseResponse, AssetCreatedResponse, AppliedFilters))
)]
pub struct AssetsApiDoc;
