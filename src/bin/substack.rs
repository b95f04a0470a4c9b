//! Sweep the configured Substack accounts once and queue new tweets.
//!
//! Reads configuration from the environment, loading `.env` first when present.

use anyhow::{Context, Result};
use genie::core::config::AppConfig;
use genie::feeds::load_substack_accounts;
use genie::pipeline::process_substack_feeds;
use tracing::{error, info};

async fn run() -> Result<()> {
    let config = AppConfig::from_env()
        .map_err(anyhow::Error::msg)
        .context("Failed to load configuration")?;

    let accounts = load_substack_accounts(&config.substack_accounts_path)?;
    info!(
        path = %config.substack_accounts_path,
        "Loaded {} Substack accounts",
        accounts.len()
    );

    let services = genie::build_services(&config)?;
    let outcome = process_substack_feeds(&services, &accounts).await?;
    info!(
        processed = outcome.processed,
        total = outcome.total,
        "{}",
        outcome.message
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    genie::setup_logging();

    if let Err(e) = run().await {
        error!("Substack sweep failed: {:#}", e);
        std::process::exit(1);
    }
}
