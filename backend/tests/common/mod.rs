//! Common test utilities for in-process API tests.
//!
//! Each [`TestApp`] owns a scratch library directory and a router built the
//! same way as the server's, driven with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

pub mod fixtures;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use asset_library_backend::api::{routes::create_router, AppState};
use asset_library_backend::config::{Config, StorageBackendKind};
use asset_library_backend::services::asset_service::AssetService;
use asset_library_backend::storage;

/// Router plus the directory backing it
pub struct TestApp {
    pub router: Router,
    pub config: Config,
    _dir: TempDir,
}

impl TestApp {
    /// Empty filesystem-backed library
    pub async fn new() -> Self {
        Self::with_backend(StorageBackendKind::Filesystem, false).await
    }

    pub async fn with_backend(backend: StorageBackendKind, seed_sample: bool) -> Self {
        Self::configured(backend, |config| config.seed_sample_asset = seed_sample).await
    }

    /// Library with `customize` applied to the default configuration
    pub async fn configured(backend: StorageBackendKind, customize: impl FnOnce(&mut Config)) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let mut config = Config::for_library(dir.path().join("library"), backend);
        customize(&mut config);

        let assets = Arc::new(AssetService::new(
            storage::from_config(&config),
            config.media_base_url.clone(),
        ));
        assets
            .bootstrap(config.seed_sample_asset)
            .await
            .expect("Failed to bootstrap library");

        let state = Arc::new(AppState::new(config.clone(), assets));
        Self {
            router: create_router(state),
            config,
            _dir: dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Create an asset and return its id
    pub async fn add(&self, asset: Value) -> String {
        let (status, body) = self.post_json("/add_asset", asset).await;
        assert_eq!(status, StatusCode::CREATED, "add_asset failed: {body}");
        body["asset"]["id"].as_str().expect("id").to_string()
    }
}
