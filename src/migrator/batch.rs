//! Run-to-completion batch driver: pagination, sequential record
//! processing, summary accounting.

use crate::error::Result;

use super::{Migrator, PAGE_SIZE};

/// Success and failure counters for a whole migration run
#[must_use]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Records that are fully migrated (including ones skipped as already
    /// migrated)
    pub succeeded: u64,
    /// Records that ended the run with fewer images than the quota
    pub failed: u64,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} records succeeded, {} records failed",
            self.succeeded, self.failed
        )
    }
}

impl Migrator {
    /// Walk the entire record store and process every record.
    ///
    /// Records are processed sequentially; only the image acquisitions
    /// within a record run concurrently. Per-record failures are counted,
    /// never fatal — only database errors abort the run.
    pub async fn run(&self) -> Result<RunSummary> {
        tokio::fs::create_dir_all(&self.staging_dir).await?;

        let mut summary = RunSummary::default();
        let mut offset = 0i64;

        loop {
            let page = self.db.list_records_page(offset, PAGE_SIZE).await?;
            if page.is_empty() {
                break;
            }

            for record in &page {
                let outcome = self.process_record(record).await?;
                if outcome.is_success() {
                    summary.succeeded += 1;
                } else {
                    summary.failed += 1;
                }
            }

            offset += PAGE_SIZE;
        }

        tracing::info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "migration run complete"
        );

        Ok(summary)
    }
}
