//! # plant-mirror
//!
//! Batch job that mirrors plant-record images into MinIO-compatible object
//! storage, rewriting each record's backup-URL field to point at the
//! mirrored copies.
//!
//! ## Design Philosophy
//!
//! plant-mirror is designed to be:
//! - **Bounded** - It pages through the record store once and exits
//! - **Idempotent** - Staged files and deterministic object keys make
//!   re-runs cheap; already-migrated records are skipped outright
//! - **Partial-failure tolerant** - Unreachable images never abort the run;
//!   whatever was acquired is persisted and counted
//!
//! ## Quick Start
//!
//! ```no_run
//! use plant_mirror::{Config, Database, HttpFetcher, Migrator, S3ObjectStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!
//!     let db = Arc::new(Database::new(&config.database_path).await?);
//!     let fetcher = Arc::new(HttpFetcher::new());
//!     let store = Arc::new(S3ObjectStore::new(&config.storage));
//!
//!     let migrator = Migrator::new(db, fetcher, store, &config.staging_dir);
//!     let summary = migrator.run().await?;
//!     println!("{summary}");
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Database persistence layer
pub mod db;
/// Error types
pub mod error;
/// Image staging (download to the local staging directory)
pub mod fetch;
/// Batch migration pipeline
pub mod migrator;
/// Object storage gateway
pub mod store;

// Re-export commonly used types
pub use config::{Config, StorageConfig};
pub use db::{Database, NewPlantRecord, PlantRecord};
pub use error::{DatabaseError, Error, Result};
pub use fetch::{HttpFetcher, ImageFetcher, StagedFile};
pub use migrator::{Migrator, RecordOutcome, RunSummary};
pub use store::{ObjectStore, S3ObjectStore};
