//! Statistics, per-asset history and popularity.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, OpenApi, ToSchema};

use super::{parse_asset_id, parse_number};
use crate::api::SharedState;
use crate::error::{AppError, Result};
use crate::services::asset_service::{AssetHistory, CheckoutStatistics, HistorySubject};
use crate::services::stats_service::{LibraryStats, PopularAsset};
use crate::storage::Revision;

const DEFAULT_POPULAR_LIMIT: usize = 10;
const DEFAULT_POPULAR_DAYS: i64 = 30;
/// Longest accepted look-back window (100 years).
const MAX_POPULAR_DAYS: i64 = 36_500;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/history", get(library_stats))
        .route("/stats", get(library_stats))
        .route("/history/:id", get(asset_history))
        .route("/popular", get(popular))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub library_statistics: LibraryStats,
    pub timestamp: DateTime<Utc>,
}

/// Library-wide statistics
#[utoipa::path(
    get,
    path = "/stats",
    tag = "history",
    responses(
        (status = 200, description = "Counts by availability, type, rarity, author and game", body = StatsResponse),
    )
)]
pub async fn library_stats(State(state): State<SharedState>) -> Result<Json<StatsResponse>> {
    Ok(Json(StatsResponse {
        library_statistics: state.assets.stats().await?,
        timestamp: Utc::now(),
    }))
}

/// Checkout and revision history of one asset
#[utoipa::path(
    get,
    path = "/history/{id}",
    tag = "history",
    params(("id" = uuid::Uuid, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Asset history", body = AssetHistory),
        (status = 404, description = "Asset not found", body = crate::api::openapi::ErrorResponse),
    )
)]
pub async fn asset_history(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<AssetHistory>> {
    let id = parse_asset_id(&id)?;
    Ok(Json(state.assets.history(id).await?))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PopularParams {
    /// Maximum number of assets (default 10)
    pub limit: Option<usize>,
    /// Look-back window in days (default 30, at most 36500)
    pub days: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PopularResponse {
    pub period_days: i64,
    pub popular_assets: Vec<PopularAsset>,
}

/// Most borrowed assets in a recent window
#[utoipa::path(
    get,
    path = "/popular",
    tag = "history",
    params(PopularParams),
    responses(
        (status = 200, description = "Assets ranked by recent checkouts", body = PopularResponse),
        (status = 400, description = "Invalid limit or days", body = crate::api::openapi::ErrorResponse),
    )
)]
pub async fn popular(
    State(state): State<SharedState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<PopularResponse>> {
    let limit = parse_number(&pairs, "limit")?.unwrap_or(DEFAULT_POPULAR_LIMIT);
    let days = parse_number(&pairs, "days")?.unwrap_or(DEFAULT_POPULAR_DAYS);
    if !(0..=MAX_POPULAR_DAYS).contains(&days) {
        return Err(AppError::Validation(format!(
            "days must be between 0 and {}",
            MAX_POPULAR_DAYS
        )));
    }

    Ok(Json(PopularResponse {
        period_days: days,
        popular_assets: state.assets.popular(limit, days).await?,
    }))
}

#[derive(OpenApi)]
#[openapi(
    paths(library_stats, asset_history, popular),
    components(schemas(
        StatsResponse,
        LibraryStats,
        AssetHistory,
        HistorySubject,
        CheckoutStatistics,
        Revision,
        PopularResponse,
        PopularAsset
    ))
)]
pub struct HistoryApiDoc;
