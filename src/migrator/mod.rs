//! Batch migration pipeline.
//!
//! The [`Migrator`] drives the whole run. Its methods are organized by
//! domain:
//! - [`acquire`] — fetch-and-publish of a single image, sliced submission
//!   through the shared concurrency pool
//! - [`record`] — per-record processing: skip check, candidate assembly,
//!   quota-driven acquisition, persistence
//! - [`batch`] — run-to-completion pagination over the record store

mod acquire;
mod batch;
mod record;


pub use batch::RunSummary;
pub use record::RecordOutcome;

use crate::db::Database;
use crate::fetch::ImageFetcher;
use crate::store::ObjectStore;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Number of images each record should end up with in object storage
pub(crate) const IMAGE_QUOTA: usize = 3;

/// Cap on concurrently in-flight acquisitions (fetch + publish pairs),
/// shared across the entire run rather than per record
pub(crate) const MAX_CONCURRENT_ACQUISITIONS: usize = 10;

/// Records read per page while walking the store
pub(crate) const PAGE_SIZE: i64 = 100;

/// Drives the migration of record images into object storage
///
/// Collaborators are injected behind their trait seams, so the processing
/// logic can be exercised against in-memory fakes.
pub struct Migrator {
    pub(crate) db: Arc<Database>,
    pub(crate) fetcher: Arc<dyn ImageFetcher>,
    pub(crate) store: Arc<dyn ObjectStore>,
    pub(crate) staging_dir: PathBuf,
    /// Process-wide pool bounding outbound network and storage load
    pub(crate) acquire_limit: Arc<Semaphore>,
}

impl Migrator {
    /// Create a migrator over the given collaborators
    pub fn new(
        db: Arc<Database>,
        fetcher: Arc<dyn ImageFetcher>,
        store: Arc<dyn ObjectStore>,
        staging_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            db,
            fetcher,
            store,
            staging_dir: staging_dir.into(),
            acquire_limit: Arc::new(Semaphore::new(MAX_CONCURRENT_ACQUISITIONS)),
        }
    }
}
