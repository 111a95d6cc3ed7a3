//! Search handler.
//!
//! Case-insensitive substring search over name, description and tags,
//! intersected with the browse filters.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, OpenApi, ToSchema};

use super::{parse_filter, parse_flag, query_value, AppliedFilters, FilterParams};
use crate::api::SharedState;
use crate::error::Result;
use crate::models::asset::Asset;
use crate::services::search_service::SearchQuery;

/// Create search routes.
pub fn router() -> Router<SharedState> {
    Router::new().route("/search", get(search))
}

/// Search-only parameters; the filters in [`FilterParams`] also apply.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Text matched against name, description and tags
    pub q: Option<String>,
    /// Shorthand for `available=true`
    pub available_only: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResponse {
    pub query: Option<String>,
    pub total_results: usize,
    pub results: Vec<Asset>,
    pub filters: AppliedFilters,
}

#[utoipa::path(
    get,
    path = "/search",
    tag = "search",
    params(SearchParams, FilterParams),
    responses(
        (status = 200, description = "Matching assets ordered by name", body = SearchResponse),
        (status = 400, description = "Invalid filter value", body = crate::api::openapi::ErrorResponse),
    ),
)]
pub async fn search(
    State(state): State<SharedState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<SearchResponse>> {
    let mut filter = parse_filter(&pairs)?;
    if let Some(flag) = query_value(&pairs, "available_only") {
        if parse_flag("available_only", flag)? {
            filter.available = Some(true);
        }
    }

    let query = SearchQuery {
        q: query_value(&pairs, "q").map(str::to_string),
        filter,
    };
    let results = state.assets.search(&query).await?;

    Ok(Json(SearchResponse {
        query: query.normalized_text(),
        total_results: results.len(),
        results,
        filters: AppliedFilters::from(&query.filter),
    }))
}

#[derive(OpenApi)]
#[openapi(paths(search), components(schemas(SearchResponse)))]
pub struct SearchApiDoc;
