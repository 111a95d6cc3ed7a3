//! Execution of `asset-admin` commands against a library directory.

use std::path::Path;

use chrono::Utc;
use serde_json::{json, Value};

use crate::cli::admin::{output, AdminCli, AdminCommand};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::asset::{AssetType, NewAsset, Rarity};
use crate::services::asset_service::AssetService;
use crate::services::fixture_service;
use crate::services::search_service::AssetFilter;
use crate::storage;

/// Run an admin CLI command
pub async fn run(cli: AdminCli) -> Result<()> {
    let mut config = Config::from_env()?;
    if let Some(library) = cli.library {
        config.library_path = library;
    }
    if let Some(ref backend) = cli.backend {
        config.storage_backend = backend.parse()?;
    }

    let service = AssetService::new(storage::from_config(&config), config.media_base_url.clone());
    service.bootstrap(config.seed_sample_asset).await?;
    execute(&service, cli.command, &cli.format).await
}

/// Execute one command on an already bootstrapped service.
pub async fn execute(service: &AssetService, command: AdminCommand, format: &str) -> Result<()> {
    match command {
        AdminCommand::Generate { count } => {
            if count == 0 {
                return Err(AppError::Validation("count must be at least 1".to_string()));
            }
            let generated = fixture_service::generate_assets(count, &mut rand::rng());
            let message = format!("Generated {} test assets", generated.len());
            service.insert_all(&generated, &message).await?;
            let ids: Vec<String> = generated.iter().map(|a| a.id.to_string()).collect();
            output(format, &message, Some(json!({ "message": message, "ids": ids })));
        }
        AdminCommand::Cleanup => {
            let removed = service
                .remove_matching(fixture_service::is_test_asset, "Cleaned up test assets")
                .await?;
            let message = format!("Removed {} test assets", removed.len());
            output(format, &message, Some(json!({ "message": message, "removed": removed })));
        }
        AdminCommand::Import { file } => {
            let entries = read_import_file(&file).await?;
            let report = service.batch_import(entries).await?;
            for failure in &report.errors {
                tracing::warn!("Skipped '{}': {}", failure.asset_name, failure.error);
            }
            output(
                format,
                &format!("Imported {} assets, {} failed", report.success, report.failed),
                Some(serde_json::to_value(&report)?),
            );
        }
        AdminCommand::Export {
            out,
            asset_type,
            rarity,
        } => {
            let filter = AssetFilter {
                asset_type: asset_type.as_deref().map(str::parse::<AssetType>).transpose()?,
                rarity: rarity.as_deref().map(str::parse::<Rarity>).transpose()?,
                ..Default::default()
            };
            let assets = service.export(&filter).await?;
            let document = json!({
                "export_timestamp": Utc::now(),
                "asset_count": assets.len(),
                "assets": assets,
            });
            let rendered = serde_json::to_string_pretty(&document)?;
            match out {
                Some(path) => {
                    tokio::fs::write(&path, rendered).await?;
                    output(
                        format,
                        &format!("Exported {} assets to {}", assets.len(), path.display()),
                        None,
                    );
                }
                None => println!("{}", rendered),
            }
        }
    }
    Ok(())
}

/// Read import entries from an export document (`{"assets": [...]}`) or a
/// bare JSON array.
async fn read_import_file(path: &Path) -> Result<Vec<NewAsset>> {
    let raw = tokio::fs::read_to_string(path).await?;
    parse_import_document(serde_json::from_str(&raw)?)
}

fn parse_import_document(document: Value) -> Result<Vec<NewAsset>> {
    let entries = match document {
        Value::Array(items) => Value::Array(items),
        Value::Object(mut map) => map.remove("assets").ok_or_else(|| {
            AppError::Validation("Import document has no 'assets' array".to_string())
        })?,
        _ => {
            return Err(AppError::Validation(
                "Import document must be an array or an object with 'assets'".to_string(),
            ))
        }
    };
    Ok(serde_json::from_value(entries)?)
}
