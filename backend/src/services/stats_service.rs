//! Library statistics, recomputed from a full scan on every call.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::asset::{Asset, AssetType, Rarity};
use crate::storage::Revision;

/// Counts grouped along each dimension. Every grouping sums to `total_assets`.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct LibraryStats {
    pub total_assets: usize,
    pub available: usize,
    pub checked_out: usize,
    pub by_type: BTreeMap<String, usize>,
    pub by_rarity: BTreeMap<String, usize>,
    pub by_author: BTreeMap<String, usize>,
    pub by_game: BTreeMap<String, usize>,
    pub recent_commits: Vec<Revision>,
}

/// Aggregate a scan of the library.
pub fn compute(assets: &[Asset]) -> LibraryStats {
    let mut stats = LibraryStats::default();
    for asset in assets {
        stats.total_assets += 1;
        if asset.available {
            stats.available += 1;
        } else {
            stats.checked_out += 1;
        }
        *stats
            .by_type
            .entry(asset.asset_type.as_str().to_string())
            .or_default() += 1;
        *stats
            .by_rarity
            .entry(asset.rarity.as_str().to_string())
            .or_default() += 1;
        *stats.by_author.entry(asset.author.clone()).or_default() += 1;
        *stats
            .by_game
            .entry(
                asset
                    .game_origin
                    .clone()
                    .unwrap_or_else(|| "unknown".to_string()),
            )
            .or_default() += 1;
    }
    stats
}

/// Checkout activity for one asset inside a time window.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PopularAsset {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    pub rarity: Rarity,
    pub recent_checkouts: usize,
    pub total_checkouts: usize,
}

/// Assets checked out at least once in the last `days`, most active first.
pub fn rank_popular(assets: &[Asset], days: i64, limit: usize, now: DateTime<Utc>) -> Vec<PopularAsset> {
    // A window reaching past the representable range counts every checkout
    let threshold = Duration::try_days(days.max(0)).and_then(|span| now.checked_sub_signed(span));
    let mut ranked: Vec<PopularAsset> = assets
        .iter()
        .filter_map(|asset| {
            let recent = asset
                .checkout_history
                .iter()
                .filter(|c| threshold.map_or(true, |t| c.checked_out >= t))
                .count();
            (recent > 0).then(|| PopularAsset {
                id: asset.id,
                name: asset.name.clone(),
                asset_type: asset.asset_type,
                rarity: asset.rarity,
                recent_checkouts: recent,
                total_checkouts: asset.checkout_history.len(),
            })
        })
        .collect();
    // Stable: ties keep store order
    ranked.sort_by(|a, b| b.recent_checkouts.cmp(&a.recent_checkouts));
    ranked.truncate(limit);
    ranked
}
