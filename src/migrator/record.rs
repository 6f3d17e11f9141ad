//! Per-record processing: skip check, candidate assembly, quota-driven
//! acquisition, persistence.

use crate::db::PlantRecord;
use crate::error::Result;

use super::acquire::SourceKind;
use super::{IMAGE_QUOTA, Migrator};

/// Species sentinel for records without a label
const UNKNOWN_SPECIES: &str = "unknown";

/// Outcome of processing a single record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The record already held a full set of storage-rooted URLs; no I/O
    /// was performed
    AlreadyMigrated,
    /// The full quota of images was published and stored
    Migrated,
    /// Fewer images than the quota could be acquired. `stored` of them were
    /// persisted; when it is 0 the database field was left untouched
    Incomplete {
        /// Number of URLs written to the record's backup field
        stored: usize,
    },
}

impl RecordOutcome {
    /// Whether this outcome counts as a success in the run summary
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, RecordOutcome::AlreadyMigrated | RecordOutcome::Migrated)
    }
}

impl Migrator {
    /// Process one record, acquiring up to the quota of images and
    /// persisting whatever was published.
    ///
    /// Only database failures propagate; unreachable candidates are ordinary
    /// control flow and show up as an [`RecordOutcome::Incomplete`] verdict.
    pub async fn process_record(&self, record: &PlantRecord) -> Result<RecordOutcome> {
        let backups = present_urls(&record.backup_urls);

        let public_base = self.store.public_base();
        let migrated = backups
            .iter()
            .filter(|url| url.starts_with(public_base))
            .count();
        if migrated >= IMAGE_QUOTA {
            tracing::info!(record_id = record.id, "record already migrated, skipping");
            return Ok(RecordOutcome::AlreadyMigrated);
        }

        let species = species_label(record);
        tracing::info!(record_id = record.id, species = %species, "processing record");

        let originals = present_urls(&record.original_urls);
        let prefix = format!("{}_{}", record.id, sanitize_label(species));

        let mut acquired = Vec::new();
        self.acquire_from_list(&prefix, SourceKind::Original, &originals, &mut acquired)
            .await;
        if acquired.len() < IMAGE_QUOTA {
            self.acquire_from_list(&prefix, SourceKind::Backup, &backups, &mut acquired)
                .await;
        }

        // Never overwrite prior data with an empty list
        if !acquired.is_empty() {
            self.db.update_backup_urls(record.id, &acquired).await?;
        }

        if acquired.len() == IMAGE_QUOTA {
            tracing::info!(
                record_id = record.id,
                uploaded = acquired.len(),
                "record migrated"
            );
            Ok(RecordOutcome::Migrated)
        } else {
            tracing::warn!(
                record_id = record.id,
                uploaded = acquired.len(),
                "record incomplete, fewer images than the quota were acquired"
            );
            Ok(RecordOutcome::Incomplete {
                stored: acquired.len(),
            })
        }
    }
}

/// Species label with the sentinel applied for absent or empty labels
fn species_label(record: &PlantRecord) -> &str {
    record
        .species
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_SPECIES)
}

/// Drop null and empty entries, keeping candidate order
fn present_urls(urls: &[Option<String>]) -> Vec<String> {
    urls.iter()
        .filter_map(|u| u.as_deref())
        .filter(|u| !u.is_empty())
        .map(str::to_string)
        .collect()
}

/// Collapse whitespace runs to underscores so labels are filename-safe
fn sanitize_label(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join("_")
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod label_tests {
    use super::*;

    fn record_with_species(species: Option<&str>) -> PlantRecord {
        PlantRecord {
            id: 1,
            species: species.map(str::to_string),
            original_urls: vec![],
            backup_urls: vec![],
        }
    }

    #[test]
    fn species_label_falls_back_to_sentinel() {
        assert_eq!(species_label(&record_with_species(None)), "unknown");
        assert_eq!(species_label(&record_with_species(Some(""))), "unknown");
        assert_eq!(
            species_label(&record_with_species(Some("Aloe vera"))),
            "Aloe vera"
        );
    }

    #[test]
    fn sanitize_label_collapses_whitespace() {
        assert_eq!(sanitize_label("Aloe vera"), "Aloe_vera");
        assert_eq!(sanitize_label("Ficus  benjamina\tvar."), "Ficus_benjamina_var.");
        assert_eq!(sanitize_label("single"), "single");
    }

    #[test]
    fn present_urls_filters_nulls_and_empties() {
        let urls = vec![
            Some("http://img.test/a.jpg".to_string()),
            None,
            Some(String::new()),
            Some("http://img.test/b.jpg".to_string()),
        ];
        assert_eq!(
            present_urls(&urls),
            vec!["http://img.test/a.jpg", "http://img.test/b.jpg"]
        );
    }
}
