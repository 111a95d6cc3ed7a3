//! API module - HTTP handlers and middleware.

pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;

use crate::config::Config;
use crate::services::asset_service::AssetService;
use std::sync::Arc;

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub assets: Arc<AssetService>,
}

impl AppState {
    pub fn new(config: Config, assets: Arc<AssetService>) -> Self {
        Self { config, assets }
    }
}

pub type SharedState = Arc<AppState>;
