//! Asset storage backends.
//!
//! Every backend keeps one JSON document per asset. The Git backend adds a
//! commit per logical mutation and exposes revision history on top of that.

pub mod filesystem;
pub mod git;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{Config, StorageBackendKind};
use crate::error::Result;
use crate::models::asset::Asset;

pub use filesystem::FilesystemStore;
pub use git::GitStore;

/// A commit that touched the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Revision {
    pub hash: String,
    pub short_hash: String,
    pub message: String,
}

/// A path with uncommitted changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ChangedFile {
    pub file: String,
    pub status: String,
}

/// Working-tree status of a versioned library.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RepositoryStatus {
    pub branch: String,
    pub current_commit: String,
    pub uncommitted_changes: usize,
    pub changed_files: Vec<ChangedFile>,
    pub recent_commits: Vec<Revision>,
}

/// Persistence for asset documents.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Short backend name for logs and health output
    fn backend_name(&self) -> &'static str;

    /// Prepare the backing location. Returns `true` when it was newly created.
    async fn init(&self) -> Result<bool>;

    /// Write (create or overwrite) an asset document
    async fn put(&self, asset: &Asset) -> Result<()>;

    /// Load an asset document, `None` if absent
    async fn get(&self, id: Uuid) -> Result<Option<Asset>>;

    /// Check if a document exists
    async fn exists(&self, id: Uuid) -> Result<bool>;

    /// Load every asset document
    async fn list(&self) -> Result<Vec<Asset>>;

    /// Remove an asset document
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Record the pending writes to `changed` as one logical change.
    /// Writes to other assets are left for their own commit.
    async fn commit(&self, message: &str, changed: &[Uuid]) -> Result<()> {
        let _ = (message, changed);
        Ok(())
    }

    /// Revisions that touched one asset, newest first.
    async fn revisions(&self, id: Uuid) -> Result<Vec<Revision>> {
        let _ = id;
        Ok(Vec::new())
    }

    /// Most recent revisions across the library, newest first.
    async fn recent_revisions(&self, limit: usize) -> Result<Vec<Revision>> {
        let _ = limit;
        Ok(Vec::new())
    }

    /// Working-tree status, `None` when the backend is not versioned.
    async fn status(&self) -> Result<Option<RepositoryStatus>> {
        Ok(None)
    }
}

/// Build the configured store.
pub fn from_config(config: &Config) -> Arc<dyn AssetStore> {
    match config.storage_backend {
        StorageBackendKind::Filesystem => Arc::new(FilesystemStore::new(config.assets_dir())),
        StorageBackendKind::Git => Arc::new(GitStore::new(
            config.library_path.clone(),
            config.git_author_name.clone(),
            config.git_author_email.clone(),
        )),
    }
}
