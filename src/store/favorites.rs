//! Favorite collection operations.

use super::{LocalStore, StoreError};
use crate::models::{FavoriteItem, Story};

#[derive(sqlx::FromRow)]
struct FavoriteRow {
    id: String,
    name: String,
    description: String,
    photo_url: String,
    created_at: String,
    lat: Option<f64>,
    lon: Option<f64>,
    favorited_at: i64,
}

impl From<FavoriteRow> for FavoriteItem {
    fn from(row: FavoriteRow) -> Self {
        FavoriteItem {
            story: Story {
                id: row.id,
                name: row.name,
                description: row.description,
                photo_url: row.photo_url,
                created_at: row.created_at,
                lat: row.lat,
                lon: row.lon,
            },
            favorited_at: row.favorited_at,
        }
    }
}

impl LocalStore {
    /// Insert or overwrite a favorite keyed by the story id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the write fails.
    pub async fn put_favorite(&self, item: &FavoriteItem) -> Result<(), StoreError> {
        let story = &item.story;
        sqlx::query(
            r"INSERT INTO favorites (id, name, description, photo_url, created_at, lat, lon, favorited_at)
              VALUES (?, ?, ?, ?, ?, ?, ?, ?)
              ON CONFLICT (id) DO UPDATE SET
                  name = excluded.name,
                  description = excluded.description,
                  photo_url = excluded.photo_url,
                  created_at = excluded.created_at,
                  lat = excluded.lat,
                  lon = excluded.lon,
                  favorited_at = excluded.favorited_at",
        )
        .bind(&story.id)
        .bind(&story.name)
        .bind(&story.description)
        .bind(&story.photo_url)
        .bind(&story.created_at)
        .bind(story.lat)
        .bind(story.lon)
        .bind(item.favorited_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Delete a favorite. Deleting an absent id is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the write fails.
    pub async fn delete_favorite(&self, id: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM favorites WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// All favorites in store order; callers apply their own ordering.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the read fails.
    pub async fn list_favorites(&self) -> Result<Vec<FavoriteItem>, StoreError> {
        let rows = sqlx::query_as::<_, FavoriteRow>(
            "SELECT id, name, description, photo_url, created_at, lat, lon, favorited_at FROM favorites",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(FavoriteItem::from).collect())
    }

    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the read fails.
    pub async fn get_favorite(&self, id: &str) -> Result<Option<FavoriteItem>, StoreError> {
        let row = sqlx::query_as::<_, FavoriteRow>(
            "SELECT id, name, description, photo_url, created_at, lat, lon, favorited_at FROM favorites WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(FavoriteItem::from))
    }

    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the read fails.
    pub async fn is_favorite(&self, id: &str) -> Result<bool, StoreError> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM favorites WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }
}

#[cfg(test)]
#[path = "favorites_test.rs"]
mod tests;
