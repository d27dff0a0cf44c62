use crate::models::FavoriteItem;
use crate::store::test_helpers::{memory_store, new_pending, story};

#[tokio::test]
async fn put_then_get_favorite() {
    let store = memory_store().await;
    let item = FavoriteItem::new(story("s1", "Sea Trip", "waves"), 10);
    store.put_favorite(&item).await.unwrap();
    assert_eq!(store.get_favorite("s1").await.unwrap(), Some(item));
    assert!(store.is_favorite("s1").await.unwrap());
}

#[tokio::test]
async fn refavorite_overwrites_instead_of_duplicating() {
    let store = memory_store().await;
    store.put_favorite(&FavoriteItem::new(story("s1", "Sea Trip", "waves"), 10)).await.unwrap();
    store.put_favorite(&FavoriteItem::new(story("s1", "Sea Trip", "waves"), 20)).await.unwrap();

    let all = store.list_favorites().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].favorited_at, 20);
}

#[tokio::test]
async fn delete_favorite_is_idempotent() {
    let store = memory_store().await;
    store.put_favorite(&FavoriteItem::new(story("s1", "a", "b"), 1)).await.unwrap();
    store.delete_favorite("s1").await.unwrap();
    store.delete_favorite("s1").await.unwrap();
    assert!(!store.is_favorite("s1").await.unwrap());
    assert!(store.list_favorites().await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_favorite_is_none() {
    let store = memory_store().await;
    assert!(store.get_favorite("nope").await.unwrap().is_none());
    assert!(!store.is_favorite("nope").await.unwrap());
}

#[tokio::test]
async fn favorites_keep_null_location() {
    let store = memory_store().await;
    let mut s = story("s1", "a", "b");
    s.lat = None;
    s.lon = None;
    store.put_favorite(&FavoriteItem::new(s, 1)).await.unwrap();
    let got = store.get_favorite("s1").await.unwrap().unwrap();
    assert!(got.story.lat.is_none());
}

#[tokio::test]
async fn collections_are_independent() {
    let store = memory_store().await;
    store.put_favorite(&FavoriteItem::new(story("s1", "a", "b"), 1)).await.unwrap();
    store.add_pending(&new_pending("b")).await.unwrap();

    store.clear_pending().await.unwrap();
    assert_eq!(store.list_favorites().await.unwrap().len(), 1);

    store.delete_favorite("s1").await.unwrap();
    store.add_pending(&new_pending("c")).await.unwrap();
    assert_eq!(store.count_pending().await.unwrap(), 1);
}
