//! OpenAPI specification generated from handler annotations via utoipa.

use utoipa::OpenApi;

/// Top-level OpenAPI document for the Asset Library API.
///
/// Each handler module contributes its own paths and schemas via per-module
/// `#[derive(OpenApi)]` structs that are merged into this root document at
/// startup.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Asset Library API",
        description = "Shared library of game assets: catalogue, search, checkout and return.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "/", description = "Current server"),
    ),
    tags(
        (name = "assets", description = "Asset catalogue"),
        (name = "search", description = "Text search and filtering"),
        (name = "circulation", description = "Checkout and return"),
        (name = "history", description = "Statistics, lending history and popularity"),
        (name = "batch", description = "Batch import, batch checkout and export"),
        (name = "utils", description = "Test data and repository status"),
        (name = "health", description = "Liveness checks"),
    ),
    components(schemas(ErrorResponse))
)]
pub struct ApiDoc;

/// Standard error response body returned by all endpoints on failure.
#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g. "NOT_FOUND", "CONFLICT")
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

/// Build the merged OpenAPI document from all handler modules.
pub fn build_openapi() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();

    doc.merge(super::handlers::health::HealthApiDoc::openapi());
    doc.merge(super::handlers::assets::AssetsApiDoc::openapi());
    doc.merge(super::handlers::search::SearchApiDoc::openapi());
    doc.merge(super::handlers::circulation::CirculationApiDoc::openapi());
    doc.merge(super::handlers::history::HistoryApiDoc::openapi());
    doc.merge(super::handlers::batch::BatchApiDoc::openapi());
    doc.merge(super::handlers::utils::UtilsApiDoc::openapi());

    doc
}
