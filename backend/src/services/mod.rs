//! Business logic services.

pub mod asset_service;
pub mod fixture_service;
pub mod search_service;
pub mod stats_service;
