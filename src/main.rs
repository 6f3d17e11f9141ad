//! plant-mirror binary.
//!
//! Loads `.env`, resolves the environment configuration, runs one migration
//! pass over the record store, and exits: 0 on normal completion (per-record
//! failures included), 1 on any unhandled top-level error.

use plant_mirror::{Config, Database, HttpFetcher, Migrator, Result, S3ObjectStore};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "migration run failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = Config::from_env()?;

    let db = Arc::new(Database::new(&config.database_path).await?);
    let fetcher = Arc::new(HttpFetcher::new());
    let store = Arc::new(S3ObjectStore::new(&config.storage));

    let migrator = Migrator::new(db.clone(), fetcher, store, &config.staging_dir);

    // Close the pool on both the success and the error path
    let result = migrator.run().await;
    db.close().await;
    let _summary = result?;

    Ok(())
}
