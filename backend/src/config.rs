//! Application configuration loaded from environment variables.

use crate::error::{AppError, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Which persistence backend holds the asset documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackendKind {
    /// Plain JSON files, one per asset
    Filesystem,
    /// JSON files committed to a Git repository on every mutation
    Git,
}

impl FromStr for StorageBackendKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "filesystem" | "fs" => Ok(Self::Filesystem),
            "git" => Ok(Self::Git),
            other => Err(AppError::Config(format!(
                "STORAGE_BACKEND must be 'filesystem' or 'git', got '{}'",
                other
            ))),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (host:port)
    pub bind_address: String,

    /// Default log filter when RUST_LOG is unset
    pub log_level: String,

    /// Root directory of the library (asset documents live in `<root>/assets`)
    pub library_path: PathBuf,

    /// Storage backend: "filesystem" or "git"
    pub storage_backend: StorageBackendKind,

    /// Base URL prepended to `media_files` entries when building media URLs
    pub media_base_url: String,

    /// Commit identity for the Git backend
    pub git_author_name: String,
    pub git_author_email: String,

    /// Seed a sample asset when the library is created
    pub seed_sample_asset: bool,

    /// "development" enables the CORS origin allow-list
    pub environment: String,

    /// Comma-separated CORS origins (development only)
    pub cors_origins: Vec<String>,

    /// OTLP collector endpoint (optional)
    pub otel_endpoint: Option<String>,

    /// Service name reported to OpenTelemetry
    pub otel_service_name: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "127.0.0.1:5000".into()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            library_path: env::var("LIBRARY_PATH")
                .unwrap_or_else(|_| "./library-repo".into())
                .into(),
            storage_backend: env::var("STORAGE_BACKEND")
                .unwrap_or_else(|_| "git".into())
                .parse()?,
            media_base_url: env::var("MEDIA_BASE_URL")
                .unwrap_or_else(|_| "https://mithrilmedia.s3.amazonaws.com".into())
                .trim_end_matches('/')
                .to_string(),
            git_author_name: env::var("GIT_AUTHOR_NAME")
                .unwrap_or_else(|_| "Asset Library System".into()),
            git_author_email: env::var("GIT_AUTHOR_EMAIL")
                .unwrap_or_else(|_| "library@example.com".into()),
            seed_sample_asset: parse_bool("SEED_SAMPLE_ASSET", true)?,
            environment: env::var("ENVIRONMENT").unwrap_or_default(),
            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            otel_endpoint: env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok(),
            otel_service_name: env::var("OTEL_SERVICE_NAME")
                .unwrap_or_else(|_| "asset-library".into()),
        })
    }

    /// Configuration rooted at `library_path` with every other value at its default.
    pub fn for_library(library_path: impl Into<PathBuf>, backend: StorageBackendKind) -> Self {
        Self {
            bind_address: "127.0.0.1:5000".into(),
            log_level: "info".into(),
            library_path: library_path.into(),
            storage_backend: backend,
            media_base_url: "https://mithrilmedia.s3.amazonaws.com".into(),
            git_author_name: "Asset Library System".into(),
            git_author_email: "library@example.com".into(),
            seed_sample_asset: false,
            environment: String::new(),
            cors_origins: Vec::new(),
            otel_endpoint: None,
            otel_service_name: "asset-library".into(),
        }
    }

    /// Directory holding one JSON document per asset.
    pub fn assets_dir(&self) -> PathBuf {
        self.library_path.join("assets")
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

fn parse_bool(key: &str, default: bool) -> Result<bool> {
    match env::var(key) {
        Err(_) => Ok(default),
        Ok(v) => match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(AppError::Config(format!(
                "{} must be a boolean, got '{}'",
                key, other
            ))),
        },
    }
}
