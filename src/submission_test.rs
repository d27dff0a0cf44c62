use super::*;
use crate::api::test_helpers::{Scripted, ScriptedApi};
use crate::connectivity::Connectivity;
use crate::models::PhotoFile;
use crate::store::test_helpers::memory_store;
use crate::sync::{SyncMessage, spawn_sync_trigger};
use tokio::sync::mpsc;

fn payload(description: &str) -> StoryPayload {
    let photo = PhotoFile { name: "cat.png".into(), mime_type: "image/png".into(), bytes: vec![1, 2, 3, 4] };
    StoryPayload::new(description, -6.2, 106.8, photo).unwrap()
}

fn policy(store: &LocalStore, api: &Arc<ScriptedApi>) -> (SubmissionPolicy, mpsc::Receiver<Notice>) {
    let (tx, rx) = mpsc::channel(16);
    let api: Arc<dyn StoryApi> = api.clone();
    (SubmissionPolicy::new(store.clone(), api).with_notices(tx), rx)
}

#[tokio::test]
async fn offline_submission_is_queued_not_sent() {
    let store = memory_store().await;
    let api = Arc::new(ScriptedApi::always(Scripted::Ok));
    let (policy, mut notices) = policy(&store, &api);
    let story = payload("offline story");

    let outcome = policy.submit(&story, false).await.unwrap();

    let pending = store.list_pending().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(outcome, SubmitOutcome::Queued { id: pending[0].id });
    assert_eq!(pending[0].to_payload().unwrap(), story);
    assert!(api.calls().is_empty());
    assert_eq!(notices.try_recv().unwrap(), Notice::Queued { id: pending[0].id });
}

#[tokio::test]
async fn online_success_is_submitted() {
    let store = memory_store().await;
    let api = Arc::new(ScriptedApi::always(Scripted::Ok));
    let (policy, mut notices) = policy(&store, &api);

    let outcome = policy.submit(&payload("hello"), true).await.unwrap();

    assert!(matches!(outcome, SubmitOutcome::Submitted { .. }));
    assert_eq!(store.count_pending().await.unwrap(), 0);
    assert_eq!(api.calls(), vec!["hello"]);
    assert_eq!(notices.try_recv().unwrap(), Notice::Submitted);
}

#[tokio::test]
async fn transport_failure_falls_back_to_queue() {
    let store = memory_store().await;
    let api = Arc::new(ScriptedApi::always(Scripted::Transport));
    let (policy, _notices) = policy(&store, &api);
    let story = payload("flaky network");

    let outcome = policy.submit(&story, true).await.unwrap();

    let pending = store.list_pending().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(outcome, SubmitOutcome::Queued { id: pending[0].id });
    assert_eq!(pending[0].to_payload().unwrap(), story);
}

#[tokio::test]
async fn rejection_is_reported_and_not_queued() {
    let store = memory_store().await;
    let api = Arc::new(ScriptedApi::always(Scripted::Rejected("photo too large")));
    let (policy, mut notices) = policy(&store, &api);

    let outcome = policy.submit(&payload("big photo"), true).await.unwrap();

    assert_eq!(outcome, SubmitOutcome::Rejected { message: "photo too large".into() });
    assert_eq!(store.count_pending().await.unwrap(), 0);
    assert_eq!(notices.try_recv().unwrap(), Notice::Rejected { message: "photo too large".into() });
}

#[tokio::test]
async fn storage_failure_fails_submission() {
    let store = memory_store().await;
    let api = Arc::new(ScriptedApi::always(Scripted::Ok));
    let (policy, mut notices) = policy(&store, &api);
    store.pool().close().await;

    let err = policy.submit(&payload("lost?"), false).await.unwrap_err();

    assert_eq!(err.kind(), FailureKind::StorageUnavailable);
    assert_eq!(err.error_code(), "E_STORAGE_UNAVAILABLE");
    let notice = notices.try_recv().unwrap();
    assert!(matches!(notice, Notice::StorageUnavailable { .. }));
    assert!(!notice.message().to_lowercase().contains("offline"));
}

#[tokio::test]
async fn storage_failure_after_transport_failure_is_not_success() {
    let store = memory_store().await;
    let api = Arc::new(ScriptedApi::always(Scripted::Transport));
    let (policy, _notices) = policy(&store, &api);
    store.pool().close().await;

    let err = policy.submit(&payload("nowhere to go"), true).await.unwrap_err();

    assert!(matches!(err, SubmitError::StorageUnavailable(_)));
}

#[tokio::test]
async fn queued_submission_registers_sync() {
    let store = memory_store().await;
    let api = Arc::new(ScriptedApi::always(Scripted::Ok));
    let connectivity = Connectivity::new(false);
    let trigger = spawn_sync_trigger(connectivity.subscribe());
    let mut page = trigger.subscribe();
    let (policy, _notices) = policy(&store, &api);
    let policy = policy.with_registration(trigger.registration());

    policy.submit(&payload("later"), false).await.unwrap();
    connectivity.set_online(true);

    let message = tokio::time::timeout(std::time::Duration::from_secs(1), page.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(message, SyncMessage::DrainRequested);
    trigger.shutdown();
}

#[tokio::test]
async fn stopped_trigger_does_not_fail_submission() {
    let store = memory_store().await;
    let api = Arc::new(ScriptedApi::always(Scripted::Ok));
    let connectivity = Connectivity::new(false);
    let trigger = spawn_sync_trigger(connectivity.subscribe());
    let registration = trigger.registration();
    trigger.shutdown();
    let (policy, _notices) = policy(&store, &api);
    let policy = policy.with_registration(registration);

    let outcome = policy.submit(&payload("still saved"), false).await.unwrap();

    assert!(matches!(outcome, SubmitOutcome::Queued { .. }));
    assert_eq!(store.count_pending().await.unwrap(), 1);
}
