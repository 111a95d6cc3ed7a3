//! Domain models.

pub mod asset;
