//! Paginated record reads and backup-URL updates.

use crate::error::DatabaseError;
use crate::{Error, Result};

use super::{Database, NewPlantRecord, PlantRecord, PlantRow};

impl Database {
    /// Insert a new plant record, returning its ID
    pub async fn insert_record(&self, record: &NewPlantRecord) -> Result<i64> {
        let original_url = serde_json::to_string(&record.original_urls)?;
        let image_backup_url = serde_json::to_string(&record.backup_urls)?;

        let result = sqlx::query(
            r#"
            INSERT INTO plants (species, original_url, image_backup_url)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&record.species)
        .bind(original_url)
        .bind(image_backup_url)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to insert record: {}",
                e
            )))
        })?;

        Ok(result.last_insert_rowid())
    }

    /// Get a single record by ID
    pub async fn get_record(&self, id: i64) -> Result<Option<PlantRecord>> {
        let row = sqlx::query_as::<_, PlantRow>(
            r#"
            SELECT id, species, original_url, image_backup_url
            FROM plants
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to get record: {}",
                e
            )))
        })?;

        Ok(row.map(PlantRecord::from))
    }

    /// Read one page of records, ordered by ID
    ///
    /// An empty page signals that the offset has walked past the end of the
    /// table; the batch driver uses that to terminate its loop.
    pub async fn list_records_page(&self, offset: i64, limit: i64) -> Result<Vec<PlantRecord>> {
        let rows = sqlx::query_as::<_, PlantRow>(
            r#"
            SELECT id, species, original_url, image_backup_url
            FROM plants
            ORDER BY id ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to list records: {}",
                e
            )))
        })?;

        Ok(rows.into_iter().map(PlantRecord::from).collect())
    }

    /// Overwrite a record's backup-URL field with the given list
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::NotFound`] if no record has the given ID.
    pub async fn update_backup_urls(&self, id: i64, urls: &[String]) -> Result<()> {
        let image_backup_url = serde_json::to_string(urls)?;

        let result = sqlx::query("UPDATE plants SET image_backup_url = ? WHERE id = ?")
            .bind(image_backup_url)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to update backup URLs: {}",
                    e
                )))
            })?;

        if result.rows_affected() == 0 {
            return Err(Error::Database(DatabaseError::NotFound(format!(
                "record {}",
                id
            ))));
        }

        Ok(())
    }

    /// Total number of records in the store
    pub async fn count_records(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM plants")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to count records: {}",
                    e
                )))
            })?;

        Ok(count)
    }
}
