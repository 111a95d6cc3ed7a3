//! Command-line interface for library maintenance.
//!
//! Operates directly on the library directory, so it can seed, clean or move
//! data without the HTTP server running.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Asset library maintenance CLI
#[derive(Parser, Debug)]
#[command(name = "asset-admin")]
#[command(about = "Maintain an asset library directory", long_about = None)]
pub struct AdminCli {
    #[command(subcommand)]
    pub command: AdminCommand,

    /// Library root (can also be set via LIBRARY_PATH env var)
    #[arg(long, env = "LIBRARY_PATH", global = true)]
    pub library: Option<PathBuf>,

    /// Storage backend: git or filesystem (STORAGE_BACKEND)
    #[arg(long, env = "STORAGE_BACKEND", global = true)]
    pub backend: Option<String>,

    /// Output format (json, text)
    #[arg(long, default_value = "text", global = true)]
    pub format: String,
}

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    /// Generate random test assets
    Generate {
        #[arg(short, long, default_value_t = 10)]
        count: usize,
    },

    /// Remove test-tagged and test-authored assets
    Cleanup,

    /// Import assets from a JSON file (an export document or a bare array)
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },

    /// Export assets as JSON
    Export {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Only assets of this type
        #[arg(long = "type")]
        asset_type: Option<String>,

        /// Only assets with this rarity
        #[arg(long)]
        rarity: Option<String>,
    },
}

/// Print a result message, or its JSON form in json mode
pub fn output(format: &str, message: &str, json_value: Option<serde_json::Value>) {
    match (format, json_value) {
        ("json", Some(value)) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&value).unwrap_or_default()
            );
        }
        ("json", None) => println!("{}", serde_json::json!({ "message": message })),
        _ => println!("{}", message),
    }
}

/// Print error message
pub fn error(format: &str, message: &str) {
    match format {
        "json" => eprintln!("{}", serde_json::json!({ "error": message })),
        _ => eprintln!("Error: {}", message),
    }
}
