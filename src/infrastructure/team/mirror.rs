//! Subscription-driven mirror of the teams collection

use std::sync::{Arc, Mutex, MutexGuard};

use futures::StreamExt;
use metrics::counter;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::document::{DocumentStore, Snapshot, SnapshotStream};
use crate::domain::team::{Team, TeamId, TEAMS_COLLECTION};
use crate::domain::DomainError;

/// Lifecycle of a mirror's subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorStatus {
    Unsubscribed,
    /// Waiting for the first snapshot
    Subscribing,
    Synced,
    /// The push channel broke; re-subscribe to recover
    Error(String),
}

#[derive(Debug)]
struct MirrorState {
    teams: Vec<Team>,
    status: MirrorStatus,
    generation: u64,
    task: Option<JoinHandle<()>>,
}

impl MirrorState {
    /// Invalidate the current subscription and stop its delivery task
    fn retire(&mut self) -> u64 {
        self.generation += 1;

        if let Some(task) = self.task.take() {
            task.abort();
        }

        self.generation
    }
}

#[derive(Debug)]
struct Shared {
    state: Mutex<MirrorState>,
    version: watch::Sender<u64>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, MirrorState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn notify(&self) {
        self.version.send_modify(|version| *version += 1);
    }

    /// Replace the list with a snapshot if `generation` is still current
    fn apply(&self, generation: u64, snapshot: Snapshot) -> bool {
        {
            let mut state = self.lock();

            if state.generation != generation {
                return false;
            }

            state.teams = decode_snapshot(snapshot);

            // Only a live subscription reaches Synced; leaving Error takes a re-subscribe.
            if matches!(state.status, MirrorStatus::Subscribing | MirrorStatus::Synced) {
                state.status = MirrorStatus::Synced;
            }
            debug!(count = state.teams.len(), "Mirror rebuilt from snapshot");
        }

        counter!("team_mirror_snapshots_total").increment(1);
        self.notify();
        true
    }

    fn fail(&self, generation: u64, error: &DomainError) {
        {
            let mut state = self.lock();

            if state.generation != generation {
                return;
            }

            warn!(error = %error, "Mirror subscription failed");
            state.status = MirrorStatus::Error(error.to_string());
            state.task = None;
        }

        self.notify();
    }
}

fn decode_snapshot(snapshot: Snapshot) -> Vec<Team> {
    snapshot
        .into_iter()
        .filter_map(|document| match TeamId::new(document.id.as_str()) {
            Ok(id) => Some(Team::from_document(id, &document.fields)),
            Err(e) => {
                warn!(error = %e, "Skipping document without an id");
                None
            }
        })
        .collect()
}

async fn deliver(shared: Arc<Shared>, generation: u64, mut stream: SnapshotStream) {
    while let Some(item) = stream.next().await {
        match item {
            Ok(snapshot) => {
                if !shared.apply(generation, snapshot) {
                    return;
                }
            }
            Err(e) => {
                shared.fail(generation, &e);
                return;
            }
        }
    }

    shared.fail(
        generation,
        &DomainError::subscription("Snapshot stream ended"),
    );
}

/// In-memory list of teams kept equal to the store's latest snapshot
///
/// Every snapshot fully replaces the list, in the order delivered. At most one
/// subscription is active: subscribing again retires the previous one first.
/// Once `unsubscribe` (or a new `subscribe`) returns, no snapshot from the
/// retired subscription is applied. The last list is kept after teardown or
/// failure.
#[derive(Debug)]
pub struct TeamMirror {
    store: Arc<dyn DocumentStore>,
    collection: String,
    shared: Arc<Shared>,
}

impl TeamMirror {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        let (version, _) = watch::channel(0);

        Self {
            store,
            collection: TEAMS_COLLECTION.to_string(),
            shared: Arc::new(Shared {
                state: Mutex::new(MirrorState {
                    teams: Vec::new(),
                    status: MirrorStatus::Unsubscribed,
                    generation: 0,
                    task: None,
                }),
                version,
            }),
        }
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// Start (or restart) the subscription
    ///
    /// Returns once the subscription is open; snapshots are applied in the
    /// background. A failure to open leaves the mirror in `Error`.
    pub async fn subscribe(&self) -> Result<(), DomainError> {
        let generation = {
            let mut state = self.shared.lock();
            state.status = MirrorStatus::Subscribing;
            state.retire()
        };
        self.shared.notify();

        info!(collection = %self.collection, "Subscribing mirror");

        let stream = match self.store.subscribe(&self.collection).await {
            Ok(stream) => stream,
            Err(e) => {
                self.shared.fail(generation, &e);
                return Err(e);
            }
        };

        let mut state = self.shared.lock();

        // A later subscribe or unsubscribe already superseded this one.
        if state.generation != generation {
            return Ok(());
        }

        state.task = Some(tokio::spawn(deliver(
            self.shared.clone(),
            generation,
            stream,
        )));

        Ok(())
    }

    /// Stop the subscription; no further snapshot is applied after this returns
    pub fn unsubscribe(&self) {
        let changed = {
            let mut state = self.shared.lock();
            state.retire();
            std::mem::replace(&mut state.status, MirrorStatus::Unsubscribed)
                != MirrorStatus::Unsubscribed
        };

        if changed {
            info!(collection = %self.collection, "Mirror unsubscribed");
            self.shared.notify();
        }
    }

    /// Replace the list with a snapshot
    ///
    /// Idempotent: applying the same snapshot twice yields the same list.
    pub fn apply_snapshot(&self, snapshot: Snapshot) {
        let generation = self.shared.lock().generation;
        self.shared.apply(generation, snapshot);
    }

    pub fn status(&self) -> MirrorStatus {
        self.shared.lock().status.clone()
    }

    pub fn teams(&self) -> Vec<Team> {
        self.shared.lock().teams.clone()
    }

    pub fn len(&self) -> usize {
        self.shared.lock().teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Change notifications: the value bumps after every applied snapshot or
    /// status change
    pub fn watch(&self) -> watch::Receiver<u64> {
        self.shared.version.subscribe()
    }
}

impl Drop for TeamMirror {
    fn drop(&mut self) {
        self.shared.lock().retire();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::domain::document::mock::MockDocumentStore;
    use crate::domain::document::Document;
    use crate::domain::fields::FieldMap;
    use crate::infrastructure::document::InMemoryDocumentStore;
    use serde_json::{json, Value};

    fn fields(value: Value) -> FieldMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn doc(id: &str, name: &str) -> Document {
        Document::new(id, fields(json!({"teamName": name, "university": "Tech U"})))
    }

    fn names(mirror: &TeamMirror) -> Vec<String> {
        mirror.teams().iter().map(|t| t.name().to_string()).collect()
    }

    async fn wait_until(mirror: &TeamMirror, condition: impl Fn(&TeamMirror) -> bool) {
        let mut rx = mirror.watch();

        tokio::time::timeout(Duration::from_secs(2), rx.wait_for(|_| condition(mirror)))
            .await
            .expect("mirror did not reach expected state")
            .expect("mirror notifications closed");
    }

    #[tokio::test]
    async fn test_starts_unsubscribed() {
        let mirror = TeamMirror::new(Arc::new(MockDocumentStore::new()));

        assert_eq!(mirror.status(), MirrorStatus::Unsubscribed);
        assert!(mirror.is_empty());
    }

    #[tokio::test]
    async fn test_first_snapshot_syncs() {
        let store = Arc::new(
            MockDocumentStore::new()
                .with_document("a", doc("a", "Alpha").fields)
                .with_document("b", doc("b", "Beta").fields),
        );
        let mirror = TeamMirror::new(store.clone());

        mirror.subscribe().await.unwrap();
        wait_until(&mirror, |m| m.status() == MirrorStatus::Synced).await;

        assert_eq!(names(&mirror), vec!["Alpha", "Beta"]);
        let ids: Vec<_> = mirror
            .teams()
            .iter()
            .map(|t| t.id().unwrap().as_str().to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_every_push_fully_replaces_list() {
        let store = Arc::new(MockDocumentStore::new());
        let mirror = TeamMirror::new(store.clone());
        mirror.subscribe().await.unwrap();
        wait_until(&mirror, |m| m.status() == MirrorStatus::Synced).await;

        store.push_snapshot(Snapshot::new(vec![doc("b", "Beta"), doc("a", "Alpha")]));
        wait_until(&mirror, |m| m.len() == 2).await;
        assert_eq!(names(&mirror), vec!["Beta", "Alpha"]);

        store.push_snapshot(Snapshot::new(vec![doc("c", "Gamma")]));
        wait_until(&mirror, |m| m.len() == 1).await;
        assert_eq!(names(&mirror), vec!["Gamma"]);
    }

    #[tokio::test]
    async fn test_identical_snapshots_are_idempotent() {
        let mirror = TeamMirror::new(Arc::new(MockDocumentStore::new()));
        let snapshot = Snapshot::new(vec![doc("a", "Alpha"), doc("b", "Beta")]);

        mirror.apply_snapshot(snapshot.clone());
        let first = mirror.teams();
        mirror.apply_snapshot(snapshot);

        assert_eq!(mirror.teams(), first);
        assert_eq!(mirror.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_snapshot_empties_mirror() {
        let mirror = TeamMirror::new(Arc::new(MockDocumentStore::new()));

        mirror.apply_snapshot(Snapshot::new(vec![doc("a", "Alpha")]));
        assert_eq!(mirror.len(), 1);

        mirror.apply_snapshot(Snapshot::default());
        assert!(mirror.is_empty());
    }

    #[tokio::test]
    async fn test_subscription_error_enters_error_state() {
        let store = Arc::new(MockDocumentStore::new());
        let mirror = TeamMirror::new(store.clone());
        mirror.subscribe().await.unwrap();
        wait_until(&mirror, |m| m.status() == MirrorStatus::Synced).await;

        store.push_error("channel reset");
        wait_until(&mirror, |m| matches!(m.status(), MirrorStatus::Error(_))).await;

        match mirror.status() {
            MirrorStatus::Error(message) => assert!(message.contains("channel reset")),
            other => panic!("unexpected status {:?}", other),
        }
        assert_eq!(store.subscribe_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_subscribe_enters_error_state() {
        let store = Arc::new(MockDocumentStore::new().with_subscribe_error("denied"));
        let mirror = TeamMirror::new(store);

        let result = mirror.subscribe().await;

        assert!(matches!(result, Err(DomainError::Subscription { .. })));
        assert!(matches!(mirror.status(), MirrorStatus::Error(_)));
    }

    #[tokio::test]
    async fn test_resubscribe_recovers_and_tears_down_previous() {
        let store = Arc::new(MockDocumentStore::new().with_document("a", doc("a", "Alpha").fields));
        let mirror = TeamMirror::new(store.clone());
        mirror.subscribe().await.unwrap();
        wait_until(&mirror, |m| m.status() == MirrorStatus::Synced).await;

        store.push_error("channel reset");
        wait_until(&mirror, |m| matches!(m.status(), MirrorStatus::Error(_))).await;

        mirror.subscribe().await.unwrap();
        wait_until(&mirror, |m| m.status() == MirrorStatus::Synced).await;

        assert_eq!(store.subscribe_count(), 2);
        assert_eq!(names(&mirror), vec!["Alpha"]);
    }

    #[tokio::test]
    async fn test_second_subscribe_leaves_one_live_subscription() {
        let store = Arc::new(MockDocumentStore::new());
        let mirror = TeamMirror::new(store.clone());

        mirror.subscribe().await.unwrap();
        mirror.subscribe().await.unwrap();
        wait_until(&mirror, |m| m.status() == MirrorStatus::Synced).await;

        // The aborted task drops its stream once the runtime reaps it.
        tokio::time::timeout(Duration::from_secs(2), async {
            while store.live_subscribers() != 1 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("previous subscription was not torn down");
    }

    #[tokio::test]
    async fn test_no_delivery_after_unsubscribe() {
        let store = Arc::new(MockDocumentStore::new());
        let mirror = TeamMirror::new(store.clone());
        mirror.subscribe().await.unwrap();
        wait_until(&mirror, |m| m.status() == MirrorStatus::Synced).await;

        mirror.unsubscribe();
        let version = *mirror.watch().borrow();

        store.push_snapshot(Snapshot::new(vec![doc("a", "Alpha")]));
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(mirror.status(), MirrorStatus::Unsubscribed);
        assert!(mirror.is_empty());
        assert_eq!(*mirror.watch().borrow(), version);
    }

    #[tokio::test]
    async fn test_keeps_documents_in_snapshot_order_whatever_their_ids() {
        let mirror = TeamMirror::new(Arc::new(MockDocumentStore::new()));

        mirror.apply_snapshot(Snapshot::new(vec![
            doc("a/b", "Slashed"),
            doc("", "Anonymous"),
            doc("c", "Gamma"),
        ]));

        assert_eq!(names(&mirror), vec!["Slashed", "Gamma"]);
        assert_eq!(mirror.teams()[0].id().map(TeamId::as_str), Some("a/b"));
    }

    #[tokio::test]
    async fn test_apply_without_subscription_keeps_status() {
        let mirror = TeamMirror::new(Arc::new(MockDocumentStore::new()));

        mirror.apply_snapshot(Snapshot::new(vec![doc("a", "Alpha")]));

        assert_eq!(mirror.status(), MirrorStatus::Unsubscribed);
        assert_eq!(names(&mirror), vec!["Alpha"]);
    }

    #[tokio::test]
    async fn test_apply_after_error_stays_in_error() {
        let store = Arc::new(MockDocumentStore::new());
        let mirror = TeamMirror::new(store.clone());
        mirror.subscribe().await.unwrap();
        wait_until(&mirror, |m| m.status() == MirrorStatus::Synced).await;

        store.push_error("channel reset");
        wait_until(&mirror, |m| matches!(m.status(), MirrorStatus::Error(_))).await;

        mirror.apply_snapshot(Snapshot::new(vec![doc("a", "Alpha")]));

        assert!(matches!(mirror.status(), MirrorStatus::Error(_)));
        assert_eq!(mirror.len(), 1);
    }

    #[tokio::test]
    async fn test_follows_in_memory_store_writes() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let mirror = TeamMirror::new(store.clone());
        mirror.subscribe().await.unwrap();
        wait_until(&mirror, |m| m.status() == MirrorStatus::Synced).await;

        store
            .upsert("teams", None, fields(json!({"teamName": "Alpha"})))
            .await
            .unwrap();
        wait_until(&mirror, |m| m.len() == 1).await;

        assert_eq!(names(&mirror), vec!["Alpha"]);
        assert!(mirror.teams()[0].is_persisted());
    }
}
