//! Asset service.
//!
//! Domain operations over an [`AssetStore`]: creation, lookup, filtering,
//! the checkout/return state machine, batch operations, export and history.
//! Mutations of one asset are serialised through a per-asset lock; every
//! successful write bumps the asset's `version`.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::asset::{Asset, AssetState, AssetType, CheckoutRecord, NewAsset};
use crate::services::search_service::{self, AssetFilter, SearchQuery};
use crate::services::stats_service::{self, LibraryStats, PopularAsset};
use crate::storage::{AssetStore, RepositoryStatus, Revision};

/// Identifier and name of an asset touched by a batch operation.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AssetRef {
    pub id: Uuid,
    pub name: String,
}

impl From<&Asset> for AssetRef {
    fn from(asset: &Asset) -> Self {
        Self {
            id: asset.id,
            name: asset.name.clone(),
        }
    }
}

/// A batch-import entry that was skipped.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ImportFailure {
    pub asset_name: String,
    pub error: String,
}

/// Outcome of a best-effort batch import.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BatchImportReport {
    pub success: usize,
    pub failed: usize,
    pub imported: Vec<AssetRef>,
    pub errors: Vec<ImportFailure>,
}

/// A batch-checkout entry that was skipped.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CheckoutFailure {
    pub asset_id: String,
    pub error: String,
}

/// Outcome of a best-effort batch checkout.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BatchCheckoutReport {
    pub success: usize,
    pub failed: usize,
    pub checked_out: Vec<AssetRef>,
    pub errors: Vec<CheckoutFailure>,
}

/// Identity and status of the asset a history belongs to.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HistorySubject {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    pub author: String,
    pub current_status: AssetState,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CheckoutStatistics {
    pub total_checkouts: usize,
    pub unique_borrowers: usize,
    pub currently_checked_out: bool,
}

/// Lending and revision history of one asset.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AssetHistory {
    pub asset: HistorySubject,
    pub statistics: CheckoutStatistics,
    pub checkout_history: Vec<CheckoutRecord>,
    pub revisions: Vec<Revision>,
}

/// Asset service
pub struct AssetService {
    store: Arc<dyn AssetStore>,
    media_base_url: String,
    locks: Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>,
}

impl AssetService {
    /// Create a new asset service
    pub fn new(store: Arc<dyn AssetStore>, media_base_url: impl Into<String>) -> Self {
        Self {
            store,
            media_base_url: media_base_url.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &Arc<dyn AssetStore> {
        &self.store
    }

    /// Prepare the store and, for a new library, seed the sample asset.
    /// Returns `true` when the library was created by this call.
    pub async fn bootstrap(&self, seed_sample: bool) -> Result<bool> {
        let created = self.store.init().await?;
        if created && seed_sample {
            let sample = sample_asset().into_asset(&self.media_base_url, Utc::now())?;
            self.store.put(&sample).await?;
            self.record("Initial library setup with sample asset", &[sample.id])
                .await;
            info!("Seeded sample asset {} ({})", sample.name, sample.id);
        }
        Ok(created)
    }

    /// Commit pending writes to `changed`, logging but not failing on error.
    async fn record(&self, message: &str, changed: &[Uuid]) {
        if let Err(e) = self.store.commit(message, changed).await {
            warn!("Failed to record change '{}' (non-blocking): {}", message, e);
        }
    }

    fn lock_for(&self, id: Uuid) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(id).or_default().clone()
    }

    fn release_lock(&self, id: Uuid) {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        if locks.get(&id).is_some_and(|l| Arc::strong_count(l) == 1) {
            locks.remove(&id);
        }
    }

    /// Run `work` while holding the lock of asset `id`.
    async fn with_lock<R>(&self, id: Uuid, work: impl Future<Output = R>) -> R {
        let lock = self.lock_for(id);
        let result = {
            let _guard = lock.lock().await;
            work.await
        };
        drop(lock);
        self.release_lock(id);
        result
    }

    /// Validate and persist a new asset.
    pub async fn create(&self, new_asset: NewAsset) -> Result<Asset> {
        let asset = self.insert(new_asset).await?;
        self.record(
            &format!("Added {}: {} by {}", asset.asset_type, asset.name, asset.author),
            &[asset.id],
        )
        .await;
        info!(asset_id = %asset.id, name = %asset.name, "Asset added");
        Ok(asset)
    }

    async fn insert(&self, new_asset: NewAsset) -> Result<Asset> {
        let asset = new_asset.into_asset(&self.media_base_url, Utc::now())?;
        if self.store.exists(asset.id).await? {
            return Err(AppError::Conflict(format!("Asset {} already exists", asset.id)));
        }
        self.store.put(&asset).await?;
        Ok(asset)
    }

    /// Get an asset by ID
    pub async fn get(&self, id: Uuid) -> Result<Asset> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Asset {} not found", id)))
    }

    /// All assets matching the filter, ordered by type then name.
    pub async fn list(&self, filter: &AssetFilter) -> Result<Vec<Asset>> {
        Ok(search_service::filter_assets(self.store.list().await?, filter))
    }

    /// Text search intersected with filters, ordered by name.
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<Asset>> {
        Ok(search_service::search_assets(self.store.list().await?, query))
    }

    /// Load, mutate and rewrite one asset under its lock.
    ///
    /// The mutation runs on a copy; when it fails nothing is written.
    pub async fn update<T, F>(&self, id: Uuid, mutate: F) -> Result<(Asset, T)>
    where
        F: FnOnce(&mut Asset) -> Result<T>,
    {
        self.with_lock(id, self.update_locked(id, mutate)).await
    }

    /// [`update`](Self::update), committing the write before the lock is
    /// released so each revision carries its own message.
    async fn update_recorded<T, F, D>(&self, id: Uuid, mutate: F, describe: D) -> Result<(Asset, T)>
    where
        F: FnOnce(&mut Asset) -> Result<T>,
        D: FnOnce(&Asset) -> String,
    {
        self.with_lock(id, async {
            let (asset, output) = self.update_locked(id, mutate).await?;
            self.record(&describe(&asset), &[id]).await;
            Ok::<_, AppError>((asset, output))
        })
        .await
    }

    async fn update_locked<T, F>(&self, id: Uuid, mutate: F) -> Result<(Asset, T)>
    where
        F: FnOnce(&mut Asset) -> Result<T>,
    {
        let mut asset = self.get(id).await?;
        let output = mutate(&mut asset)?;
        asset.version += 1;
        asset.updated_at = Utc::now();
        self.store.put(&asset).await?;
        Ok((asset, output))
    }

    /// `Available -> CheckedOut`.
    pub async fn checkout(
        &self,
        id: Uuid,
        borrower: &str,
        game_context: Option<String>,
    ) -> Result<Asset> {
        let borrower = require_borrower(borrower)?;
        let context = game_context.clone();
        let (asset, ()) = self
            .update_recorded(
                id,
                |asset| asset.check_out(borrower, context, Utc::now()),
                |asset| {
                    let mut message = format!("Checkout: {} to {}", asset.name, borrower);
                    if let Some(ctx) = game_context.as_deref().filter(|c| !c.is_empty()) {
                        message.push_str(&format!(" for {}", ctx));
                    }
                    message
                },
            )
            .await?;
        info!(asset_id = %id, borrower, "Asset checked out");
        Ok(asset)
    }

    /// `CheckedOut -> Available`. Returns the asset and the closed checkout.
    pub async fn return_asset(
        &self,
        id: Uuid,
        borrower: &str,
        condition: Option<String>,
        notes: Option<String>,
    ) -> Result<(Asset, CheckoutRecord)> {
        let borrower = require_borrower(borrower)?;
        let condition = condition
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| "good".to_string());
        let notes = notes.unwrap_or_default();
        let recorded_condition = condition.clone();

        let (asset, closed) = self
            .update_recorded(
                id,
                |asset| asset.check_in(borrower, condition, notes, Utc::now()),
                |asset| {
                    format!(
                        "Return: {} from {} (condition: {})",
                        asset.name, borrower, recorded_condition
                    )
                },
            )
            .await?;
        info!(asset_id = %id, borrower, "Asset returned");
        Ok((asset, closed))
    }

    /// Checkout statistics plus revision history for one asset.
    pub async fn history(&self, id: Uuid) -> Result<AssetHistory> {
        let asset = self.get(id).await?;
        let revisions = self.store.revisions(id).await?;

        let borrowers: HashSet<&str> = asset
            .checkout_history
            .iter()
            .map(|c| c.borrower.as_str())
            .collect();
        let statistics = CheckoutStatistics {
            total_checkouts: asset.checkout_history.len(),
            unique_borrowers: borrowers.len(),
            currently_checked_out: asset.active_checkout().is_some(),
        };

        Ok(AssetHistory {
            asset: HistorySubject {
                id: asset.id,
                name: asset.name.clone(),
                asset_type: asset.asset_type,
                author: asset.author.clone(),
                current_status: asset.state(),
            },
            statistics,
            checkout_history: asset.checkout_history,
            revisions,
        })
    }

    /// Library-wide counts, with recent revisions when versioned.
    pub async fn stats(&self) -> Result<LibraryStats> {
        let assets = self.store.list().await?;
        let mut stats = stats_service::compute(&assets);
        stats.recent_commits = self.store.recent_revisions(5).await?;
        Ok(stats)
    }

    /// Most checked-out assets in the last `days`.
    pub async fn popular(&self, limit: usize, days: i64) -> Result<Vec<PopularAsset>> {
        let assets = self.store.list().await?;
        Ok(stats_service::rank_popular(&assets, days, limit, Utc::now()))
    }

    /// Create each entry independently; failures are reported, not fatal.
    pub async fn batch_import(&self, entries: Vec<NewAsset>) -> Result<BatchImportReport> {
        if entries.is_empty() {
            return Err(AppError::Validation("No assets provided".to_string()));
        }

        let mut imported = Vec::new();
        let mut errors = Vec::new();
        for entry in entries {
            let asset_name = entry.name.clone().unwrap_or_else(|| "unknown".to_string());
            match self.insert(entry).await {
                Ok(asset) => imported.push(AssetRef::from(&asset)),
                Err(e) => errors.push(ImportFailure {
                    asset_name,
                    error: e.to_string(),
                }),
            }
        }

        if !imported.is_empty() {
            let ids: Vec<Uuid> = imported.iter().map(|a| a.id).collect();
            self.record(&format!("Batch import: {} assets added", imported.len()), &ids)
                .await;
        }
        info!(
            imported = imported.len(),
            failed = errors.len(),
            "Batch import finished"
        );

        Ok(BatchImportReport {
            success: imported.len(),
            failed: errors.len(),
            imported,
            errors,
        })
    }

    /// Check out each asset independently; failures are reported, not fatal.
    pub async fn batch_checkout(
        &self,
        asset_ids: Vec<String>,
        borrower: &str,
        game_context: Option<String>,
    ) -> Result<BatchCheckoutReport> {
        let borrower = require_borrower(borrower)?;
        if asset_ids.is_empty() {
            return Err(AppError::Validation("Missing asset_ids".to_string()));
        }

        let mut checked_out = Vec::new();
        let mut errors = Vec::new();
        for raw_id in asset_ids {
            let outcome = match Uuid::parse_str(raw_id.trim()) {
                Ok(id) => {
                    let context = game_context.clone();
                    self.update(id, |asset| asset.check_out(borrower, context, Utc::now()))
                        .await
                        .map(|(asset, ())| asset)
                }
                Err(_) => Err(AppError::Validation(format!("Invalid asset id '{}'", raw_id))),
            };
            match outcome {
                Ok(asset) => checked_out.push(AssetRef::from(&asset)),
                Err(e) => errors.push(CheckoutFailure {
                    asset_id: raw_id,
                    error: e.to_string(),
                }),
            }
        }

        if !checked_out.is_empty() {
            let ids: Vec<Uuid> = checked_out.iter().map(|a| a.id).collect();
            self.record(
                &format!("Batch checkout: {} assets to {}", checked_out.len(), borrower),
                &ids,
            )
            .await;
        }

        Ok(BatchCheckoutReport {
            success: checked_out.len(),
            failed: errors.len(),
            checked_out,
            errors,
        })
    }

    /// Filtered assets with lending state stripped.
    pub async fn export(&self, filter: &AssetFilter) -> Result<Vec<Asset>> {
        Ok(self
            .list(filter)
            .await?
            .iter()
            .map(Asset::to_export)
            .collect())
    }

    /// Persist pre-built assets (fixture generation) as one change.
    pub async fn insert_all(&self, assets: &[Asset], message: &str) -> Result<()> {
        for asset in assets {
            self.store.put(asset).await?;
        }
        if !assets.is_empty() {
            let ids: Vec<Uuid> = assets.iter().map(|a| a.id).collect();
            self.record(message, &ids).await;
        }
        Ok(())
    }

    /// Delete every asset matching `predicate` as one change.
    pub async fn remove_matching<P>(&self, predicate: P, message: &str) -> Result<Vec<AssetRef>>
    where
        P: Fn(&Asset) -> bool,
    {
        let mut removed = Vec::new();
        for asset in self.store.list().await? {
            if !predicate(&asset) {
                continue;
            }
            match self.with_lock(asset.id, self.store.delete(asset.id)).await {
                Ok(()) => removed.push(AssetRef::from(&asset)),
                // Removed by a concurrent cleanup
                Err(AppError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        if !removed.is_empty() {
            let ids: Vec<Uuid> = removed.iter().map(|a| a.id).collect();
            self.record(message, &ids).await;
        }
        Ok(removed)
    }

    /// Working-tree status of a versioned library.
    pub async fn repository_status(&self) -> Result<RepositoryStatus> {
        self.store.status().await?.ok_or_else(|| {
            AppError::Unavailable(format!(
                "Repository status requires the git backend (current: {})",
                self.store.backend_name()
            ))
        })
    }
}

fn require_borrower(borrower: &str) -> Result<&str> {
    let borrower = borrower.trim();
    if borrower.is_empty() {
        return Err(AppError::Validation("Missing borrower".to_string()));
    }
    Ok(borrower)
}

fn sample_asset() -> NewAsset {
    NewAsset {
        name: Some("Mithril Sword".into()),
        asset_type: Some("item".into()),
        author: Some("System".into()),
        game_origin: Some("sample_game".into()),
        description: Some("A legendary sword forged from mithril".into()),
        attributes: serde_json::json!({
            "damage": 45,
            "durability": 100,
            "weight": 2.5,
            "enchantment": "flame",
        })
        .as_object()
        .cloned(),
        media: Some(
            [
                ("image", "https://example.com/mithril_sword.png"),
                ("model", "https://example.com/mithril_sword.obj"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        ),
        media_files: None,
        cross_game_compatible: Some(true),
        rarity: Some("legendary".into()),
        tags: Some(
            ["sword", "weapon", "mithril", "enchanted"]
                .into_iter()
                .map(String::from)
                .collect(),
        ),
    }
}
