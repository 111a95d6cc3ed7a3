//! HTTP request handlers.

pub mod assets;
pub mod batch;
pub mod circulation;
pub mod health;
pub mod history;
pub mod search;
pub mod utils;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::services::search_service::AssetFilter;

/// Query parameters shared by `/browse`, `/search` and `/export`.
///
/// Extraction goes through [`parse_filter`] on the raw pairs so that `tag`
/// can repeat; this struct only documents the parameters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FilterParams {
    /// Asset type (artwork, creature, item, npc, character, environment, audio, model)
    #[serde(rename = "type")]
    pub asset_type: Option<String>,
    pub author: Option<String>,
    /// Game of origin
    pub game: Option<String>,
    pub rarity: Option<String>,
    pub available: Option<bool>,
    /// Required tag; repeat for several
    pub tag: Option<Vec<String>>,
}

/// Echo of the filters applied to a listing.
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct AppliedFilters {
    #[serde(rename = "type")]
    pub asset_type: Option<String>,
    pub author: Option<String>,
    pub game: Option<String>,
    pub rarity: Option<String>,
    pub available: Option<bool>,
    pub tags: Vec<String>,
}

impl From<&AssetFilter> for AppliedFilters {
    fn from(filter: &AssetFilter) -> Self {
        Self {
            asset_type: filter.asset_type.map(|t| t.to_string()),
            author: filter.author.clone(),
            game: filter.game_origin.clone(),
            rarity: filter.rarity.map(|r| r.to_string()),
            available: filter.available,
            tags: filter.tags.clone(),
        }
    }
}

/// Build an [`AssetFilter`] from raw query pairs. Empty values are ignored;
/// unrecognised keys are left for the caller.
pub fn parse_filter(pairs: &[(String, String)]) -> Result<AssetFilter> {
    let mut filter = AssetFilter::default();
    for (key, value) in pairs {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match key.as_str() {
            "type" => filter.asset_type = Some(value.parse()?),
            "rarity" => filter.rarity = Some(value.parse()?),
            "author" => filter.author = Some(value.to_string()),
            "game" => filter.game_origin = Some(value.to_string()),
            "available" => filter.available = Some(parse_flag(key, value)?),
            "tag" => filter.tags.push(value.to_string()),
            _ => {}
        }
    }
    Ok(filter)
}

/// Value of the first non-empty occurrence of `key`.
pub fn query_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, v)| k == key && !v.trim().is_empty())
        .map(|(_, v)| v.as_str())
}

pub fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(AppError::Validation(format!(
            "Invalid value '{}' for {}: expected true or false",
            value, key
        ))),
    }
}

/// Parse an asset ID; anything that is not a UUID cannot name an asset.
pub fn parse_asset_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::NotFound(format!("Asset {} not found", raw)))
}

/// Parse an optional numeric query parameter.
pub fn parse_number<T: std::str::FromStr>(pairs: &[(String, String)], key: &str) -> Result<Option<T>> {
    query_value(pairs, key)
        .map(|v| {
            v.trim()
                .parse()
                .map_err(|_| AppError::Validation(format!("Invalid value '{}' for {}", v, key)))
        })
        .transpose()
}
