//! Database layer for plant-mirror
//!
//! Handles SQLite persistence for the plant record store.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`migrations`] — Database lifecycle, schema migrations
//! - [`records`] — Paginated record reads and backup-URL updates

use sqlx::{FromRow, sqlite::SqlitePool};

mod migrations;
mod records;

/// New plant record to be inserted into the database
///
/// Used by seeding and tests; the migration run itself only reads and
/// updates existing rows.
#[derive(Debug, Clone, Default)]
pub struct NewPlantRecord {
    /// Species label, used only to build staging filenames
    pub species: Option<String>,
    /// Candidate source URLs in priority order (may contain nulls)
    pub original_urls: Vec<Option<String>>,
    /// Previously stored or fallback URLs (may contain nulls)
    pub backup_urls: Vec<Option<String>>,
}

/// One plant record with its URL lists decoded from their JSON columns
///
/// Null and empty entries survive decoding; callers filter them at candidate
/// assembly so that ordinal numbering matches the filtered lists.
#[derive(Debug, Clone)]
pub struct PlantRecord {
    /// Unique database ID
    pub id: i64,
    /// Species label; absent labels fall back to a sentinel when building
    /// staging filenames
    pub species: Option<String>,
    /// Candidate source URLs in priority order
    pub original_urls: Vec<Option<String>>,
    /// Previously stored or fallback URLs; overwritten with newly published
    /// URLs on success
    pub backup_urls: Vec<Option<String>>,
}

/// Raw plant row as stored (URL lists are JSON text columns)
#[derive(Debug, Clone, FromRow)]
struct PlantRow {
    id: i64,
    species: Option<String>,
    original_url: Option<String>,
    image_backup_url: Option<String>,
}

impl From<PlantRow> for PlantRecord {
    fn from(row: PlantRow) -> Self {
        PlantRecord {
            id: row.id,
            species: row.species,
            original_urls: decode_url_list(row.original_url.as_deref()),
            backup_urls: decode_url_list(row.image_backup_url.as_deref()),
        }
    }
}

/// Decode a JSON URL-array column. NULL columns and values that are not a
/// JSON array decode to an empty list rather than failing the whole page.
fn decode_url_list(raw: Option<&str>) -> Vec<Option<String>> {
    raw.and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default()
}

/// Database handle for plant-mirror
pub struct Database {
    pool: SqlitePool,
}
