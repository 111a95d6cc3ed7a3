//! Filesystem storage backend: `<dir>/<id>.json` per asset.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::warn;
use uuid::Uuid;

use super::AssetStore;
use crate::error::{AppError, Result};
use crate::models::asset::Asset;

/// Directory of JSON documents
pub struct FilesystemStore {
    base_path: PathBuf,
}

impl FilesystemStore {
    /// Create a store rooted at the assets directory
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &std::path::Path {
        &self.base_path
    }

    fn id_to_path(&self, id: Uuid) -> PathBuf {
        self.base_path.join(format!("{}.json", id))
    }
}

#[async_trait]
impl AssetStore for FilesystemStore {
    fn backend_name(&self) -> &'static str {
        "filesystem"
    }

    async fn init(&self) -> Result<bool> {
        if fs::try_exists(&self.base_path).await? {
            return Ok(false);
        }
        fs::create_dir_all(&self.base_path).await?;
        Ok(true)
    }

    async fn put(&self, asset: &Asset) -> Result<()> {
        let path = self.id_to_path(asset.id);
        fs::create_dir_all(&self.base_path).await?;

        let content = serde_json::to_vec_pretty(asset)?;

        // Write atomically via temp file
        let temp_path = path.with_extension("json.tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(&content).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &path).await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Asset>> {
        let path = self.id_to_path(id);
        match fs::read(&path).await {
            Ok(content) => Ok(Some(serde_json::from_slice(&content).map_err(|e| {
                AppError::Storage(format!("Corrupt asset document {}: {}", id, e))
            })?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Storage(format!("Failed to read {}: {}", id, e))),
        }
    }

    async fn exists(&self, id: Uuid) -> Result<bool> {
        Ok(fs::try_exists(self.id_to_path(id)).await?)
    }

    async fn list(&self) -> Result<Vec<Asset>> {
        if !fs::try_exists(&self.base_path).await? {
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        let mut entries = fs::read_dir(&self.base_path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        // Stable order across calls
        paths.sort();

        let mut assets = Vec::with_capacity(paths.len());
        for path in paths {
            let content = match fs::read(&path).await {
                Ok(content) => content,
                // Deleted since the directory was read
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            match serde_json::from_slice::<Asset>(&content) {
                Ok(asset) => assets.push(asset),
                Err(e) => warn!("Skipping unreadable asset document {}: {}", path.display(), e),
            }
        }
        Ok(assets)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let path = self.id_to_path(id);
        fs::remove_file(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::NotFound(format!("Asset {} not found", id))
            } else {
                AppError::Storage(format!("Failed to delete {}: {}", id, e))
            }
        })
    }
}
