//! The store itself: named collections of documents plus the watcher
//! registry that powers live subscriptions.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::document::Document;
use crate::error::{Result, StoreError};
use crate::query::Query;
use crate::subscription::Subscription;

/// Lock a mutex, recovering the data if a panicking holder poisoned it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub(crate) struct Watcher {
    query: Query,
    tx: mpsc::UnboundedSender<Vec<Document>>,
}

#[derive(Default)]
pub(crate) struct CollectionState {
    docs: Vec<Document>,
    watchers: HashMap<u64, Watcher>,
}

impl CollectionState {
    pub(crate) fn remove_watcher(&mut self, id: u64) {
        self.watchers.remove(&id);
    }

    /// Re-evaluate every watcher's query against the current documents and
    /// deliver the full result set. Watchers whose receiver is gone are
    /// pruned here; explicit unsubscription removes them eagerly.
    fn notify(&mut self) {
        if self.watchers.is_empty() {
            return;
        }
        let docs = self.docs.clone();
        self.watchers.retain(|_, watcher| {
            let mut snapshot = docs.clone();
            watcher.query.apply(&mut snapshot);
            watcher.tx.send(snapshot).is_ok()
        });
    }
}

pub(crate) struct StoreInner {
    pub(crate) collections: Mutex<HashMap<String, CollectionState>>,
    clock: Mutex<DateTime<Utc>>,
    next_watcher_id: AtomicU64,
}

impl StoreInner {
    /// Server-assigned creation timestamp, strictly monotonic per store.
    fn next_timestamp(&self) -> DateTime<Utc> {
        let mut last = lock(&self.clock);
        let mut now = Utc::now();
        if now <= *last {
            now = *last + Duration::microseconds(1);
        }
        *last = now;
        now
    }
}

/// Handle to the document store. Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl Store {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(StoreInner {
                collections: Mutex::new(HashMap::new()),
                clock: Mutex::new(DateTime::<Utc>::MIN_UTC),
                next_watcher_id: AtomicU64::new(0),
            }),
        }
    }

    /// Handle to a named collection. Collections spring into existence on
    /// first write; reading a never-written collection sees it empty.
    pub fn collection(&self, name: impl Into<String>) -> Collection {
        Collection {
            inner: Arc::clone(&self.inner),
            name: name.into(),
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a single collection.
#[derive(Clone)]
pub struct Collection {
    inner: Arc<StoreInner>,
    name: String,
}

impl Collection {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a new document. The store assigns the identifier and the
    /// creation timestamp; `fields` must be a JSON object.
    pub async fn add(&self, fields: Value) -> Result<Document> {
        if !fields.is_object() {
            return Err(StoreError::NotAnObject);
        }
        let doc = Document {
            id: Uuid::new_v4(),
            created_at: self.inner.next_timestamp(),
            fields,
        };

        let mut collections = lock(&self.inner.collections);
        let state = collections.entry(self.name.clone()).or_default();
        state.docs.push(doc.clone());
        state.notify();

        tracing::debug!(collection = %self.name, id = %doc.id, "document added");
        Ok(doc)
    }

    /// Fetch a document by identifier. `None` when it does not exist.
    pub async fn get(&self, id: Uuid) -> Result<Option<Document>> {
        let collections = lock(&self.inner.collections);
        Ok(collections
            .get(&self.name)
            .and_then(|state| state.docs.iter().find(|doc| doc.id == id).cloned()))
    }

    /// Delete by identifier. Idempotent: returns whether a document was
    /// actually removed. Irreversible.
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut collections = lock(&self.inner.collections);
        let Some(state) = collections.get_mut(&self.name) else {
            return Ok(false);
        };
        let before = state.docs.len();
        state.docs.retain(|doc| doc.id != id);
        let removed = state.docs.len() < before;
        if removed {
            state.notify();
            tracing::debug!(collection = %self.name, id = %id, "document deleted");
        }
        Ok(removed)
    }

    /// One-shot read of every document matching the query, in the query's
    /// order (insertion order when no ordering is imposed).
    pub async fn get_all(&self, query: &Query) -> Result<Vec<Document>> {
        let collections = lock(&self.inner.collections);
        let mut docs = collections
            .get(&self.name)
            .map(|state| state.docs.clone())
            .unwrap_or_default();
        query.apply(&mut docs);
        Ok(docs)
    }

    /// Total number of documents in the collection.
    pub async fn count(&self) -> Result<usize> {
        let collections = lock(&self.inner.collections);
        Ok(collections
            .get(&self.name)
            .map(|state| state.docs.len())
            .unwrap_or(0))
    }

    /// Open a live query. The current result set is delivered immediately;
    /// afterwards every change to the collection delivers the full result
    /// set again. The returned handle must be released (explicitly or by
    /// drop) or the watcher keeps running for the life of the store.
    pub fn subscribe(&self, query: Query) -> Subscription {
        let watcher_id = self.inner.next_watcher_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();

        let mut collections = lock(&self.inner.collections);
        let state = collections.entry(self.name.clone()).or_default();

        let mut initial = state.docs.clone();
        query.apply(&mut initial);
        // Receiver is alive at this point; send cannot fail.
        let _ = tx.send(initial);

        state.watchers.insert(watcher_id, Watcher { query, tx });
        drop(collections);

        tracing::debug!(collection = %self.name, watcher_id, "subscription opened");
        Subscription::new(Arc::clone(&self.inner), self.name.clone(), watcher_id, rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Direction, CREATED_AT};
    use serde_json::json;

    #[tokio::test]
    async fn add_assigns_id_and_monotonic_timestamps() {
        let store = Store::new();
        let coll = store.collection("tasks");

        let a = coll.add(json!({"task": "first"})).await.unwrap();
        let b = coll.add(json!({"task": "second"})).await.unwrap();

        assert_ne!(a.id, b.id);
        assert!(b.created_at > a.created_at);
    }

    #[tokio::test]
    async fn add_rejects_non_object_fields() {
        let store = Store::new();
        let err = store.collection("tasks").add(json!("bare")).await;
        assert!(matches!(err, Err(StoreError::NotAnObject)));
    }

    #[tokio::test]
    async fn get_and_delete_round_trip() {
        let store = Store::new();
        let coll = store.collection("tasks");
        let doc = coll.add(json!({"task": "x"})).await.unwrap();

        assert_eq!(coll.get(doc.id).await.unwrap(), Some(doc.clone()));
        assert!(coll.delete(doc.id).await.unwrap());
        assert_eq!(coll.get(doc.id).await.unwrap(), None);
        // Second delete is a no-op.
        assert!(!coll.delete(doc.id).await.unwrap());
    }

    #[tokio::test]
    async fn get_all_filters_and_orders() {
        let store = Store::new();
        let coll = store.collection("comments");
        coll.add(json!({"taskId": "t1", "comment": "a"})).await.unwrap();
        coll.add(json!({"taskId": "t2", "comment": "b"})).await.unwrap();
        coll.add(json!({"taskId": "t1", "comment": "c"})).await.unwrap();

        let query = Query::new().where_eq("taskId", json!("t1"));
        let docs = coll.get_all(&query).await.unwrap();
        assert_eq!(docs.len(), 2);
        // No ordering imposed: insertion order preserved.
        assert_eq!(docs[0].field("comment"), Some(&json!("a")));
        assert_eq!(docs[1].field("comment"), Some(&json!("c")));

        let newest_first = Query::new().order_by(CREATED_AT, Direction::Desc);
        let all = coll.get_all(&newest_first).await.unwrap();
        assert_eq!(all[0].field("comment"), Some(&json!("c")));
    }

    #[tokio::test]
    async fn count_tracks_collection_size() {
        let store = Store::new();
        let coll = store.collection("tasks");
        assert_eq!(coll.count().await.unwrap(), 0);
        coll.add(json!({"task": "x"})).await.unwrap();
        coll.add(json!({"task": "y"})).await.unwrap();
        assert_eq!(coll.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn subscription_delivers_initial_and_full_snapshots() {
        let store = Store::new();
        let coll = store.collection("tasks");
        coll.add(json!({"task": "existing"})).await.unwrap();

        let mut sub = coll.subscribe(Query::new().order_by(CREATED_AT, Direction::Desc));

        let initial = sub.next().await.unwrap();
        assert_eq!(initial.len(), 1);

        let added = coll.add(json!({"task": "new"})).await.unwrap();
        let snapshot = sub.next().await.unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].id, added.id);

        coll.delete(added.id).await.unwrap();
        let snapshot = sub.next().await.unwrap();
        assert_eq!(snapshot.len(), 1);
    }

    #[tokio::test]
    async fn subscription_snapshots_respect_the_filter() {
        let store = Store::new();
        let coll = store.collection("tasks");

        let mine = json!({"email": "me@example.com"});
        let mut sub = coll.subscribe(Query::new().where_eq("user", mine.clone()));
        assert!(sub.next().await.unwrap().is_empty());

        coll.add(json!({"task": "mine", "user": mine})).await.unwrap();
        coll.add(json!({"task": "theirs", "user": {"email": "other@example.com"}}))
            .await
            .unwrap();

        // Both writes trigger a notification, but only my task matches.
        let snapshot = sub.next().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        let snapshot = sub.next().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].field("task"), Some(&json!("mine")));
    }

    #[tokio::test]
    async fn try_next_drains_buffered_snapshots_without_waiting() {
        let store = Store::new();
        let coll = store.collection("tasks");
        let mut sub = coll.subscribe(Query::new());

        // The initial snapshot is already buffered; nothing beyond it.
        assert_eq!(sub.try_next().unwrap().len(), 0);
        assert_eq!(sub.try_next(), None);

        coll.add(json!({"task": "x"})).await.unwrap();
        assert_eq!(sub.try_next().unwrap().len(), 1);
        assert_eq!(sub.try_next(), None);
    }

    #[tokio::test]
    async fn unsubscribe_stops_delivery() {
        let store = Store::new();
        let coll = store.collection("tasks");

        let mut sub = coll.subscribe(Query::new());
        assert!(sub.next().await.unwrap().is_empty());

        sub.unsubscribe();
        coll.add(json!({"task": "after"})).await.unwrap();
        assert_eq!(sub.next().await, None);
    }

    #[tokio::test]
    async fn dropping_the_handle_releases_the_watcher() {
        let store = Store::new();
        let coll = store.collection("tasks");

        let sub = coll.subscribe(Query::new());
        drop(sub);

        // The next mutation must not observe any watcher.
        coll.add(json!({"task": "x"})).await.unwrap();
        let collections = lock(&coll.inner.collections);
        assert!(collections.get("tasks").unwrap().watchers.is_empty());
    }
}
