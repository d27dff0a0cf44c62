use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::api::StoryApi;
use crate::api::test_helpers::{Scripted, ScriptedApi};
use crate::connectivity::Connectivity;
use crate::store::LocalStore;
use crate::store::test_helpers::{memory_store, new_pending};
use tokio::sync::oneshot;

async fn seeded() -> LocalStore {
    let store = memory_store().await;
    store.add_pending(&new_pending("queued")).await.unwrap();
    store
}

fn coordinator(store: &LocalStore) -> DrainCoordinator {
    let api: Arc<dyn StoryApi> = Arc::new(ScriptedApi::always(Scripted::Ok));
    DrainCoordinator::new(store.clone(), api)
}

async fn wait_until_empty(store: &LocalStore) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while store.count_pending().await.unwrap() > 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("queue was not drained");
}

#[tokio::test]
async fn drains_on_trigger_message() {
    let store = seeded().await;
    let connectivity = Connectivity::new(true);
    let (clients, rx) = broadcast::channel(4);
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(run_foreground(coordinator(&store), Some(rx), connectivity.subscribe(), async {
        stop_rx.await.ok();
    }));
    clients.send(SyncMessage::DrainRequested).unwrap();

    wait_until_empty(&store).await;
    stop_tx.send(()).unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn drains_on_restoration_without_trigger() {
    let store = seeded().await;
    let connectivity = Connectivity::new(false);
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(run_foreground(coordinator(&store), None, connectivity.subscribe(), async {
        stop_rx.await.ok();
    }));
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(store.count_pending().await.unwrap(), 1);

    connectivity.set_online(true);

    wait_until_empty(&store).await;
    stop_tx.send(()).unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn falls_back_when_trigger_closes() {
    let store = seeded().await;
    let connectivity = Connectivity::new(false);
    let (clients, rx) = broadcast::channel::<SyncMessage>(4);
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(run_foreground(coordinator(&store), Some(rx), connectivity.subscribe(), async {
        stop_rx.await.ok();
    }));
    drop(clients);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(store.count_pending().await.unwrap(), 1);

    connectivity.set_online(true);

    wait_until_empty(&store).await;
    stop_tx.send(()).unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn shutdown_stops_loop() {
    let store = memory_store().await;
    let connectivity = Connectivity::new(true);

    tokio::time::timeout(
        Duration::from_secs(1),
        run_foreground(coordinator(&store), None, connectivity.subscribe(), async {}),
    )
    .await
    .expect("loop did not stop");
}
