//! Favorites: user-curated local copies of remote stories.
//!
//! The store keeps favorites unordered; searching and sorting happen here on
//! the listed items so the same rules apply regardless of storage order.

use std::str::FromStr;

use tracing::info;

use crate::models::{FavoriteItem, Story, now_ms};
use crate::store::{LocalStore, StoreError};

/// Ordering applied to a favorites listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Most recently favorited first.
    #[default]
    Newest,
    /// Least recently favorited first.
    Oldest,
    /// By name, lexicographic.
    Name,
    /// Leave store order untouched.
    Unsorted,
}

impl FromStr for SortOrder {
    type Err = std::convert::Infallible;

    /// Unknown keys fall back to store order rather than failing.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "newest" => Self::Newest,
            "oldest" => Self::Oldest,
            "name" => Self::Name,
            _ => Self::Unsorted,
        })
    }
}

/// Case-insensitive substring match over name and description.
#[must_use]
pub fn search_favorites(items: Vec<FavoriteItem>, query: &str) -> Vec<FavoriteItem> {
    let needle = query.to_lowercase();
    items
        .into_iter()
        .filter(|item| {
            item.story.name.to_lowercase().contains(&needle) || item.story.description.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Stable sort of a favorites listing.
#[must_use]
pub fn sort_favorites(mut items: Vec<FavoriteItem>, order: SortOrder) -> Vec<FavoriteItem> {
    match order {
        SortOrder::Newest => items.sort_by(|a, b| b.favorited_at.cmp(&a.favorited_at)),
        SortOrder::Oldest => items.sort_by(|a, b| a.favorited_at.cmp(&b.favorited_at)),
        SortOrder::Name => items.sort_by(|a, b| a.story.name.cmp(&b.story.name)),
        SortOrder::Unsorted => {}
    }
    items
}

/// Favorites operations over the local store.
#[derive(Clone)]
pub struct Favorites {
    store: LocalStore,
}

impl Favorites {
    #[must_use]
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    /// Favorite a story, stamping `favoritedAt` with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the store cannot be written.
    pub async fn add(&self, story: Story) -> Result<FavoriteItem, StoreError> {
        let item = FavoriteItem::new(story, now_ms());
        self.store.put_favorite(&item).await?;
        info!(id = %item.id(), "story favorited");
        Ok(item)
    }

    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the store cannot be written.
    pub async fn remove(&self, id: &str) -> Result<(), StoreError> {
        self.store.delete_favorite(id).await?;
        info!(%id, "story unfavorited");
        Ok(())
    }

    /// Flip the favorite state of a story. Returns `true` if it is now a favorite.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the store cannot be read or written.
    pub async fn toggle(&self, story: Story) -> Result<bool, StoreError> {
        if self.store.is_favorite(&story.id).await? {
            self.remove(&story.id).await?;
            Ok(false)
        } else {
            self.add(story).await?;
            Ok(true)
        }
    }

    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the store cannot be read.
    pub async fn is_favorite(&self, id: &str) -> Result<bool, StoreError> {
        self.store.is_favorite(id).await
    }

    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the store cannot be read.
    pub async fn list(&self) -> Result<Vec<FavoriteItem>, StoreError> {
        self.store.list_favorites().await
    }

    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the store cannot be read.
    pub async fn search(&self, query: &str) -> Result<Vec<FavoriteItem>, StoreError> {
        Ok(search_favorites(self.list().await?, query))
    }

    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the store cannot be read.
    pub async fn sorted(&self, order: SortOrder) -> Result<Vec<FavoriteItem>, StoreError> {
        Ok(sort_favorites(self.list().await?, order))
    }
}

#[cfg(test)]
#[path = "favorites_test.rs"]
mod tests;
