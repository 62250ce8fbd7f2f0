//! `recipe-api [CONFIG]`
//!
//! Loads the configuration (file, then environment), opens the configured
//! storage and serves the API until Ctrl+C or SIGTERM.

use clap::Parser;
use recipe_api::prelude::*;
use tracing::info;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// YAML configuration file; defaults and environment variables apply when omitted
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = AppConfig::load(cli.config.as_deref())?;
    info!(
        backend = ?config.storage.backend,
        prefix = %config.server.api_prefix,
        "configuration loaded"
    );

    let storage = Storage::from_config(&config.storage).await?;
    let addr = config.bind_address();

    ServerBuilder::new()
        .with_config(config)
        .with_storage(storage)
        .serve(&addr)
        .await
}
