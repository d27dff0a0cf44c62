//! Pending submission queue operations.

use tracing::debug;

use super::{LocalStore, StoreError};
use crate::models::{NewPendingSubmission, PendingSubmission, now_ms};

const PENDING_COLUMNS: &str = "id, description, lat, lon, photo_data, photo_name, photo_mime_type, enqueued_at";

impl LocalStore {
    /// Insert a new pending submission. The id is assigned by the store and
    /// never reused; `enqueued_at` never goes below the newest existing entry.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the write fails.
    pub async fn add_pending(&self, record: &NewPendingSubmission) -> Result<PendingSubmission, StoreError> {
        let sql = format!(
            "INSERT INTO pending_stories (description, lat, lon, photo_data, photo_name, photo_mime_type, enqueued_at)
             VALUES (?, ?, ?, ?, ?, ?, MAX(?, COALESCE((SELECT MAX(enqueued_at) FROM pending_stories), 0)))
             RETURNING {PENDING_COLUMNS}"
        );
        let row = sqlx::query_as::<_, PendingSubmission>(&sql)
            .bind(&record.description)
            .bind(record.lat)
            .bind(record.lon)
            .bind(&record.photo_data)
            .bind(&record.photo_name)
            .bind(&record.photo_mime_type)
            .bind(now_ms())
            .fetch_one(&self.pool)
            .await?;
        debug!(id = row.id, enqueued_at = row.enqueued_at, "pending submission stored");
        Ok(row)
    }

    /// All pending submissions, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the read fails.
    pub async fn list_pending(&self) -> Result<Vec<PendingSubmission>, StoreError> {
        let sql = format!("SELECT {PENDING_COLUMNS} FROM pending_stories ORDER BY id ASC");
        let rows = sqlx::query_as::<_, PendingSubmission>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    /// Delete a pending submission. Deleting an absent id is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the write fails.
    pub async fn delete_pending(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM pending_stories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            debug!(id, "pending submission already absent");
        }
        Ok(())
    }

    /// Remove every pending submission, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the write fails.
    pub async fn clear_pending(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM pending_stories").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    /// Number of queued submissions.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the read fails.
    pub async fn count_pending(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pending_stories").fetch_one(&self.pool).await?;
        Ok(count)
    }
}

#[cfg(test)]
#[path = "pending_test.rs"]
mod tests;
