//! Asset Library - Main Entry Point

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use asset_library_backend::{
    api::{self, AppState},
    config::Config,
    error::{AppError, Result},
    services::asset_service::AssetService,
    storage, telemetry,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing; the guard flushes exported spans on exit
    let _otel_guard = telemetry::init_tracing(&config);
    tracing::info!("Starting Asset Library");

    // Open the library
    let store = storage::from_config(&config);
    let assets = Arc::new(AssetService::new(store, config.media_base_url.clone()));
    if assets.bootstrap(config.seed_sample_asset).await? {
        tracing::info!(
            "Created {} library at {}",
            assets.store().backend_name(),
            config.library_path.display()
        );
    } else {
        tracing::info!(
            "Opened {} library at {}",
            assets.store().backend_name(),
            config.library_path.display()
        );
    }

    let cors = cors_layer(&config)?;
    let addr: SocketAddr = config.bind_address.parse()?;
    let state = Arc::new(AppState::new(config, assets));

    // Build router
    let app = Router::new()
        .merge(api::routes::create_router(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Development allows only the configured origins; otherwise any origin.
fn cors_layer(config: &Config) -> Result<CorsLayer> {
    if config.is_development() {
        let origins = config
            .cors_origins
            .iter()
            .map(|origin| {
                origin
                    .parse::<HeaderValue>()
                    .map_err(|_| AppError::Config(format!("Invalid CORS origin '{}'", origin)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT]))
    } else {
        Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any))
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
