//! Persistent local store for pending submissions and favorites.
//!
//! DESIGN
//! ======
//! One SQLite database holds two independent collections: `pending_stories`
//! (the offline submission queue) and `favorites`. `LocalStore` is a cheap
//! `Clone` handle over the pool, so the submission policy, the drain
//! coordinator, and the favorites service can each hold one.
//!
//! ERROR HANDLING
//! ==============
//! Every database failure surfaces as [`StoreError::Unavailable`]. Nothing is
//! retried here; callers decide what an unavailable store means for them.

mod favorites;
mod pending;

use sqlx::SqlitePool;

use crate::error::{ErrorCode, FailureKind};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("local storage unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),
}

impl StoreError {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        FailureKind::StorageUnavailable
    }
}

impl ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "E_STORAGE_UNAVAILABLE",
        }
    }
}

/// Handle to the local durable store.
#[derive(Clone)]
pub struct LocalStore {
    pool: SqlitePool,
}

impl LocalStore {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use super::*;
    use crate::models::{NewPendingSubmission, Story};

    pub async fn memory_store() -> LocalStore {
        LocalStore::new(crate::db::test_helpers::memory_pool().await)
    }

    #[must_use]
    pub fn story(id: &str, name: &str, description: &str) -> Story {
        Story {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            photo_url: format!("https://example.test/{id}.jpg"),
            created_at: "2024-05-01T10:00:00.000Z".into(),
            lat: Some(-6.2),
            lon: Some(106.8),
        }
    }

    #[must_use]
    pub fn new_pending(description: &str) -> NewPendingSubmission {
        NewPendingSubmission {
            description: description.into(),
            lat: 1.5,
            lon: 2.5,
            photo_data: crate::photo::encode_data_url("image/jpeg", description.as_bytes()),
            photo_name: "photo.jpg".into(),
            photo_mime_type: "image/jpeg".into(),
        }
    }
}
