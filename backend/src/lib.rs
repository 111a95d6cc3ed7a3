//! Asset Library - Backend Library
//!
//! A shared library of game assets: catalogue, search, checkout and return,
//! persisted as JSON documents with optional Git versioning.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;
pub mod telemetry;

pub use config::Config;
pub use error::{AppError, Result};
