//! Asset Library - maintenance CLI

use clap::Parser;

use asset_library_backend::cli::{admin, run_admin, AdminCli};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "asset_library_backend=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = AdminCli::parse();
    let format = cli.format.clone();
    if let Err(e) = run_admin(cli).await {
        admin::error(&format, &e.to_string());
        std::process::exit(1);
    }
}
