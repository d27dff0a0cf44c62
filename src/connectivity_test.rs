use super::*;
use std::sync::Mutex;

#[test]
fn set_online_reports_changes_only() {
    let c = Connectivity::new(false);
    assert!(!c.set_online(false));
    assert!(c.set_online(true));
    assert!(c.is_online());
    assert!(!c.set_online(true));
}

#[tokio::test]
async fn restoration_fires_on_offline_to_online() {
    let c = Connectivity::new(false);
    let mut watch = RestorationWatch::new(c.subscribe());

    let publisher = c.clone();
    tokio::spawn(async move {
        publisher.set_online(true);
    });

    let restored = tokio::time::timeout(Duration::from_secs(1), watch.restored()).await.unwrap();
    assert!(restored);
    assert!(watch.is_online());
}

#[tokio::test]
async fn going_offline_is_not_a_restoration() {
    let c = Connectivity::new(true);
    let mut watch = RestorationWatch::new(c.subscribe());
    c.set_online(false);

    let result = tokio::time::timeout(Duration::from_millis(50), watch.restored()).await;
    assert!(result.is_err(), "offline transition must not count as restored");
}

#[tokio::test]
async fn restoration_ends_when_source_dropped() {
    let c = Connectivity::new(false);
    let mut watch = RestorationWatch::new(c.subscribe());
    drop(c);
    assert!(!watch.restored().await);
}

struct ScriptedProbe {
    answers: Mutex<Vec<bool>>,
}

#[async_trait::async_trait]
impl Reachability for ScriptedProbe {
    async fn reachable(&self) -> bool {
        let mut answers = self.answers.lock().unwrap();
        if answers.len() > 1 { answers.remove(0) } else { answers.first().copied().unwrap_or(false) }
    }
}

#[tokio::test]
async fn probe_publishes_reachability() {
    let c = Connectivity::new(false);
    let mut watch = RestorationWatch::new(c.subscribe());
    let probe = Arc::new(ScriptedProbe { answers: Mutex::new(vec![false, true]) });

    let task = spawn_connectivity_probe(probe, c.clone(), Duration::from_millis(5));
    let restored = tokio::time::timeout(Duration::from_secs(1), watch.restored()).await.unwrap();
    task.abort();

    assert!(restored);
    assert!(c.is_online());
}

#[tokio::test]
async fn zero_probe_interval_still_polls() {
    let c = Connectivity::new(false);
    let mut watch = RestorationWatch::new(c.subscribe());
    let probe = Arc::new(ScriptedProbe { answers: Mutex::new(vec![true]) });

    let task = spawn_connectivity_probe(probe, c.clone(), Duration::ZERO);
    let restored = tokio::time::timeout(Duration::from_secs(1), watch.restored()).await.unwrap();
    assert!(!task.is_finished());
    task.abort();

    assert!(restored);
}
