//! Asset model and its checkout state machine.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Kind of catalogued asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Artwork,
    Creature,
    Item,
    Npc,
    Character,
    Environment,
    Audio,
    Model,
}

impl AssetType {
    pub const ALL: [AssetType; 8] = [
        AssetType::Artwork,
        AssetType::Creature,
        AssetType::Item,
        AssetType::Npc,
        AssetType::Character,
        AssetType::Environment,
        AssetType::Audio,
        AssetType::Model,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Artwork => "artwork",
            AssetType::Creature => "creature",
            AssetType::Item => "item",
            AssetType::Npc => "npc",
            AssetType::Character => "character",
            AssetType::Environment => "environment",
            AssetType::Audio => "audio",
            AssetType::Model => "model",
        }
    }

    /// Attribute values every new asset of this type starts with.
    pub fn default_attributes(&self) -> Map<String, Value> {
        let defaults = match self {
            AssetType::Creature => serde_json::json!({
                "power": 50,
                "defense": 50,
                "health": 100,
                "speed": 50,
            }),
            AssetType::Npc => serde_json::json!({
                "personality": "neutral",
                "faction": "neutral",
                "stats": {"health": 100, "friendliness": 50},
            }),
            _ => return Map::new(),
        };
        match defaults {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == needle)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "Unknown asset type '{}'; expected one of: {}",
                    s,
                    Self::ALL.map(|t| t.as_str()).join(", ")
                ))
            })
    }
}

/// Desirability tier of an asset.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub const ALL: [Rarity; 5] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rarity {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == needle)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "Unknown rarity '{}'; expected one of: {}",
                    s,
                    Self::ALL.map(|r| r.as_str()).join(", ")
                ))
            })
    }
}

/// One checkout of an asset, closed when the asset is returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CheckoutRecord {
    pub borrower: String,
    pub checked_out: DateTime<Utc>,
    #[serde(default)]
    pub returned: Option<DateTime<Utc>>,
    #[serde(default)]
    pub game_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_notes: Option<String>,
}

impl CheckoutRecord {
    pub fn is_open(&self) -> bool {
        self.returned.is_none()
    }
}

/// Availability of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AssetState {
    Available,
    CheckedOut,
}

/// Asset entity, persisted as one JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Asset {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    pub author: String,
    #[serde(default)]
    pub game_origin: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub attributes: Map<String, Value>,
    #[serde(default)]
    pub media: BTreeMap<String, String>,
    #[serde(default = "default_true")]
    pub cross_game_compatible: bool,
    #[serde(default)]
    pub rarity: Rarity,
    #[serde(default)]
    #[schema(value_type = Vec<String>)]
    pub tags: BTreeSet<String>,
    #[serde(default = "default_true")]
    pub available: bool,
    #[serde(default)]
    pub current_borrower: Option<String>,
    #[serde(default)]
    pub checked_out_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub returned_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    #[serde(default = "default_version")]
    pub version: u64,
    #[serde(default)]
    pub checkout_history: Vec<CheckoutRecord>,
}

fn default_true() -> bool {
    true
}

fn default_version() -> u64 {
    1
}

impl Asset {
    pub fn state(&self) -> AssetState {
        if self.available {
            AssetState::Available
        } else {
            AssetState::CheckedOut
        }
    }

    /// Case-insensitive tag lookup.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// The open checkout, if the asset is currently lent out.
    pub fn active_checkout(&self) -> Option<&CheckoutRecord> {
        self.checkout_history.iter().rev().find(|c| c.is_open())
    }

    /// `Available -> CheckedOut`.
    pub fn check_out(
        &mut self,
        borrower: &str,
        game_context: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<()> {
        if let AssetState::CheckedOut = self.state() {
            return Err(AppError::Conflict(format!(
                "Asset {} is already checked out to {}",
                self.id,
                self.current_borrower.as_deref().unwrap_or("unknown")
            )));
        }

        self.available = false;
        self.current_borrower = Some(borrower.to_string());
        self.checked_out_at = Some(at);
        self.checkout_history.push(CheckoutRecord {
            borrower: borrower.to_string(),
            checked_out: at,
            returned: None,
            game_context,
            return_condition: None,
            return_notes: None,
        });
        Ok(())
    }

    /// `CheckedOut -> Available`. Returns the closed checkout record.
    pub fn check_in(
        &mut self,
        borrower: &str,
        condition: String,
        notes: String,
        at: DateTime<Utc>,
    ) -> Result<CheckoutRecord> {
        if let AssetState::Available = self.state() {
            return Err(AppError::Conflict(format!(
                "Asset {} is not checked out",
                self.id
            )));
        }
        if self.current_borrower.as_deref() != Some(borrower) {
            return Err(AppError::Conflict(format!(
                "Asset {} is checked out to someone else",
                self.id
            )));
        }

        let open = self
            .checkout_history
            .iter()
            .rposition(|c| c.is_open() && c.borrower == borrower);
        let idx = match open {
            Some(idx) => idx,
            None => {
                // Documents written without history still get a closed entry.
                self.checkout_history.push(CheckoutRecord {
                    borrower: borrower.to_string(),
                    checked_out: self.checked_out_at.unwrap_or(at),
                    returned: None,
                    game_context: None,
                    return_condition: None,
                    return_notes: None,
                });
                self.checkout_history.len() - 1
            }
        };

        let record = &mut self.checkout_history[idx];
        record.returned = Some(at);
        record.return_condition = Some(condition);
        record.return_notes = Some(notes);
        let closed = record.clone();

        self.available = true;
        self.current_borrower = None;
        self.returned_at = Some(at);
        Ok(closed)
    }

    /// Copy suitable for export: lending state and history stripped.
    pub fn to_export(&self) -> Asset {
        let mut exported = self.clone();
        exported.checkout_history.clear();
        exported.current_borrower = None;
        exported.available = true;
        exported.checked_out_at = None;
        exported.returned_at = None;
        exported
    }
}

/// Input for creating an asset.
///
/// Required fields are optional here so that validation can report all
/// missing fields at once instead of failing on the first.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct NewAsset {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub asset_type: Option<String>,
    pub author: Option<String>,
    pub game_origin: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub attributes: Option<Map<String, Value>>,
    pub media: Option<BTreeMap<String, String>>,
    /// Media label to object filename; expanded to URLs under the media base URL
    pub media_files: Option<BTreeMap<String, String>>,
    pub cross_game_compatible: Option<bool>,
    pub rarity: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl NewAsset {
    /// Validate and build a fresh asset. `media_base_url` has no trailing slash.
    pub fn into_asset(self, media_base_url: &str, now: DateTime<Utc>) -> Result<Asset> {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        let missing: Vec<&str> = [
            ("name", present(&self.name)),
            ("type", present(&self.asset_type)),
            ("author", present(&self.author)),
        ]
        .into_iter()
        .filter(|(_, ok)| !ok)
        .map(|(field, _)| field)
        .collect();
        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let asset_type: AssetType = self.asset_type.as_deref().unwrap_or_default().parse()?;
        let rarity = match self.rarity.as_deref() {
            Some(r) if !r.trim().is_empty() => r.parse()?,
            _ => Rarity::default(),
        };

        let mut attributes = asset_type.default_attributes();
        attributes.extend(self.attributes.unwrap_or_default());

        let mut media = self.media.unwrap_or_default();
        for (label, filename) in self.media_files.unwrap_or_default() {
            media.insert(
                label,
                format!("{}/{}", media_base_url, filename.trim_start_matches('/')),
            );
        }

        let tags = self
            .tags
            .unwrap_or_default()
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        Ok(Asset {
            id: Uuid::new_v4(),
            name: self.name.unwrap_or_default().trim().to_string(),
            asset_type,
            author: self.author.unwrap_or_default().trim().to_string(),
            game_origin: self.game_origin.filter(|g| !g.trim().is_empty()),
            description: self.description.unwrap_or_default(),
            attributes,
            media,
            cross_game_compatible: self.cross_game_compatible.unwrap_or(true),
            rarity,
            tags,
            available: true,
            current_borrower: None,
            checked_out_at: None,
            returned_at: None,
            created_at: now,
            updated_at: now,
            version: 1,
            checkout_history: Vec::new(),
        })
    }
}
