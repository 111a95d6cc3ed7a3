//! Test-data generation and cleanup.

use chrono::Utc;
use rand::seq::IndexedRandom;
use rand::Rng;
use serde_json::json;
use uuid::Uuid;

use crate::models::asset::{Asset, AssetType, Rarity};

const CREATURE_NAMES: &[&str] = &["Fire Drake", "Ice Wyrm", "Thunder Beast", "Shadow Stalker"];
const ITEM_NAMES: &[&str] = &["Health Potion", "Mana Crystal", "Power Elixir", "Shield Charm"];
const ELEMENTS: &[&str] = &["fire", "ice", "thunder", "earth"];
const GAMES: &[&str] = &["battlemonsters3000", "survival_game"];

/// Tag carried by every generated asset.
pub const TEST_TAG: &str = "test";

/// Build `count` random assets, alternating creatures and items.
pub fn generate_assets<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Asset> {
    let now = Utc::now();
    (0..count)
        .map(|i| {
            let creature = i % 2 == 0;
            let (asset_type, names, description) = if creature {
                (AssetType::Creature, CREATURE_NAMES, "Auto-generated test creature")
            } else {
                (AssetType::Item, ITEM_NAMES, "Auto-generated test item")
            };
            let attributes = if creature {
                json!({
                    "power": rng.random_range(30..=100),
                    "defense": rng.random_range(30..=100),
                    "health": rng.random_range(50..=250),
                    "element": pick(ELEMENTS, rng),
                })
            } else {
                json!({
                    "effects": [{"type": "heal", "value": rng.random_range(10..=50)}],
                    "consumable": rng.random_bool(0.5),
                })
            };

            Asset {
                id: Uuid::new_v4(),
                name: format!("{} #{}", pick(names, rng), i + 1),
                asset_type,
                author: format!("test_author_{}", rng.random_range(1..=3)),
                game_origin: Some(pick(GAMES, rng).to_string()),
                description: description.to_string(),
                attributes: attributes.as_object().cloned().unwrap_or_default(),
                media: Default::default(),
                cross_game_compatible: !creature || rng.random_bool(0.5),
                rarity: *Rarity::ALL.choose(rng).unwrap_or(&Rarity::Common),
                tags: [TEST_TAG, asset_type.as_str()]
                    .into_iter()
                    .map(String::from)
                    .collect(),
                available: true,
                current_borrower: None,
                checked_out_at: None,
                returned_at: None,
                created_at: now,
                updated_at: now,
                version: 1,
                checkout_history: Vec::new(),
            }
        })
        .collect()
}

fn pick<'a, R: Rng + ?Sized>(options: &[&'a str], rng: &mut R) -> &'a str {
    options.choose(rng).copied().unwrap_or_default()
}

/// Assets removed by cleanup: test authors or the test tag.
pub fn is_test_asset(asset: &Asset) -> bool {
    asset.author.to_lowercase().contains(TEST_TAG) || asset.has_tag(TEST_TAG)
}
