//! Filtering and text search over asset documents.
//!
//! Both operate on a full scan of the store; there is no index.

use crate::models::asset::{Asset, AssetType, Rarity};

/// Conjunction of equality filters. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetFilter {
    pub asset_type: Option<AssetType>,
    pub author: Option<String>,
    pub game_origin: Option<String>,
    pub rarity: Option<Rarity>,
    pub available: Option<bool>,
    /// Every listed tag must be present on the asset
    pub tags: Vec<String>,
}

impl AssetFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, asset: &Asset) -> bool {
        if self.asset_type.is_some_and(|t| t != asset.asset_type) {
            return false;
        }
        if self.rarity.is_some_and(|r| r != asset.rarity) {
            return false;
        }
        if self.available.is_some_and(|a| a != asset.available) {
            return false;
        }
        if let Some(ref author) = self.author {
            if &asset.author != author {
                return false;
            }
        }
        if let Some(ref game) = self.game_origin {
            if asset.game_origin.as_ref() != Some(game) {
                return false;
            }
        }
        self.tags.iter().all(|tag| asset.has_tag(tag))
    }
}

/// Text query plus filters.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub filter: AssetFilter,
}

impl SearchQuery {
    /// Lower-cased, trimmed query text; `None` when blank.
    pub fn normalized_text(&self) -> Option<String> {
        self.q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase)
    }
}

/// Case-insensitive substring match against name, description and tags.
/// `needle` must already be lower-case.
pub fn matches_text(asset: &Asset, needle: &str) -> bool {
    asset.name.to_lowercase().contains(needle)
        || asset.description.to_lowercase().contains(needle)
        || asset.tags.iter().any(|t| t.to_lowercase().contains(needle))
}

/// Apply a filter, ordering by `(type, name)`.
pub fn filter_assets(assets: Vec<Asset>, filter: &AssetFilter) -> Vec<Asset> {
    let mut matched: Vec<Asset> = assets.into_iter().filter(|a| filter.matches(a)).collect();
    matched.sort_by(|a, b| {
        a.asset_type
            .as_str()
            .cmp(b.asset_type.as_str())
            .then_with(|| a.name.cmp(&b.name))
    });
    matched
}

/// Apply text query and filters, ordering by name.
pub fn search_assets(assets: Vec<Asset>, query: &SearchQuery) -> Vec<Asset> {
    let needle = query.normalized_text();
    let mut matched: Vec<Asset> = assets
        .into_iter()
        .filter(|a| query.filter.matches(a))
        .filter(|a| needle.as_deref().map_or(true, |n| matches_text(a, n)))
        .collect();
    matched.sort_by(|a, b| a.name.cmp(&b.name));
    matched
}
