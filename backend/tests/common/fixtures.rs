//! Asset payloads shared by the API tests.

#![allow(dead_code)]

use serde_json::{json, Value};

pub fn fire_sword() -> Value {
    json!({
        "name": "Fire Sword",
        "type": "item",
        "rarity": "epic",
        "author": "smith",
        "game_origin": "battlemonsters3000",
        "description": "A blade wreathed in flame",
        "tags": ["weapon", "sword", "fire"]
    })
}

pub fn ice_wyrm() -> Value {
    json!({
        "name": "Ice Wyrm",
        "type": "creature",
        "rarity": "rare",
        "author": "frost",
        "game_origin": "survival_game",
        "tags": ["dragon", "ice"]
    })
}

pub fn health_potion() -> Value {
    json!({
        "name": "Health Potion",
        "type": "item",
        "author": "alchemist",
        "tags": ["potion", "consumable"]
    })
}

pub fn test_authored(name: &str) -> Value {
    json!({
        "name": name,
        "type": "item",
        "author": "test_author_1"
    })
}
