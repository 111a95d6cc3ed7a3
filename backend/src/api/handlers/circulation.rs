//! Checkout and return handlers.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use super::parse_asset_id;
use crate::api::extract::ApiJson;
use crate::api::SharedState;
use crate::error::{AppError, Result};
use crate::models::asset::Asset;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/checkout", post(checkout))
        .route("/return", post(return_asset))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub asset_id: Option<String>,
    pub borrower: Option<String>,
    /// Game or session the asset is borrowed for
    pub game_context: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    pub message: String,
    pub asset: Asset,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReturnRequest {
    pub asset_id: Option<String>,
    pub borrower: Option<String>,
    /// Defaults to `good`
    pub condition: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReturnDetails {
    pub asset_id: Uuid,
    pub asset_name: String,
    pub borrower: String,
    pub condition: String,
    pub notes: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReturnResponse {
    pub message: String,
    pub return_details: ReturnDetails,
    pub asset: Asset,
}

/// Both fields are mandatory on checkout and return.
fn required(asset_id: Option<String>, borrower: Option<String>) -> Result<(Uuid, String)> {
    let asset_id = asset_id.filter(|s| !s.trim().is_empty());
    let borrower = borrower.filter(|s| !s.trim().is_empty());
    match (asset_id, borrower) {
        (Some(asset_id), Some(borrower)) => Ok((parse_asset_id(&asset_id)?, borrower)),
        _ => Err(AppError::Validation(
            "Missing asset_id or borrower".to_string(),
        )),
    }
}

/// Check out an available asset
#[utoipa::path(
    post,
    path = "/checkout",
    tag = "circulation",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Asset checked out", body = CheckoutResponse),
        (status = 400, description = "Missing asset_id or borrower", body = crate::api::openapi::ErrorResponse),
        (status = 404, description = "Asset not found", body = crate::api::openapi::ErrorResponse),
        (status = 409, description = "Asset already checked out", body = crate::api::openapi::ErrorResponse),
    )
)]
pub async fn checkout(
    State(state): State<SharedState>,
    ApiJson(payload): ApiJson<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    let (id, borrower) = required(payload.asset_id, payload.borrower)?;
    let asset = state
        .assets
        .checkout(id, &borrower, payload.game_context)
        .await?;
    Ok(Json(CheckoutResponse {
        message: "Asset checked out successfully".to_string(),
        asset,
    }))
}

/// Return a checked-out asset
#[utoipa::path(
    post,
    path = "/return",
    tag = "circulation",
    request_body = ReturnRequest,
    responses(
        (status = 200, description = "Asset returned", body = ReturnResponse),
        (status = 400, description = "Missing asset_id or borrower", body = crate::api::openapi::ErrorResponse),
        (status = 404, description = "Asset not found", body = crate::api::openapi::ErrorResponse),
        (status = 409, description = "Asset not checked out, or checked out to someone else", body = crate::api::openapi::ErrorResponse),
    )
)]
pub async fn return_asset(
    State(state): State<SharedState>,
    ApiJson(payload): ApiJson<ReturnRequest>,
) -> Result<Json<ReturnResponse>> {
    let (id, borrower) = required(payload.asset_id, payload.borrower)?;
    let (asset, closed) = state
        .assets
        .return_asset(id, &borrower, payload.condition, payload.notes)
        .await?;

    Ok(Json(ReturnResponse {
        message: "Asset returned successfully".to_string(),
        return_details: ReturnDetails {
            asset_id: asset.id,
            asset_name: asset.name.clone(),
            borrower: closed.borrower,
            condition: closed.return_condition.unwrap_or_default(),
            notes: closed.return_notes.unwrap_or_default(),
        },
        asset,
    }))
}

#[derive(OpenApi)]
#[openapi(
    paths(checkout, return_asset),
    components(schemas(
        CheckoutRequest,
        CheckoutResponse,
        ReturnRequest,
        ReturnResponse,
        ReturnDetails
    ))
)]
pub struct CirculationApiDoc;
