//! Live-query handles.
//!
//! A [`Subscription`] is the scoped acquisition of a watcher: it must be
//! released deterministically when the owning view goes away, either via
//! [`Subscription::unsubscribe`] or by dropping the handle. Reclamation is
//! never left to garbage collection — a leaked watcher keeps delivering
//! snapshots for the life of the store.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::document::Document;
use crate::store::{lock, StoreInner};

/// Handle to an open live query.
pub struct Subscription {
    inner: Arc<StoreInner>,
    collection: String,
    watcher_id: u64,
    rx: mpsc::UnboundedReceiver<Vec<Document>>,
    active: bool,
}

impl Subscription {
    pub(crate) fn new(
        inner: Arc<StoreInner>,
        collection: String,
        watcher_id: u64,
        rx: mpsc::UnboundedReceiver<Vec<Document>>,
    ) -> Self {
        Self {
            inner,
            collection,
            watcher_id,
            rx,
            active: true,
        }
    }

    /// Wait for the next full result set. The first call yields the
    /// snapshot taken at subscription time. Returns `None` once the
    /// subscription is released and all buffered snapshots are drained.
    pub async fn next(&mut self) -> Option<Vec<Document>> {
        self.rx.recv().await
    }

    /// Non-blocking variant of [`next`](Self::next).
    pub fn try_next(&mut self) -> Option<Vec<Document>> {
        self.rx.try_recv().ok()
    }

    /// Deregister the watcher. Snapshots already delivered remain readable;
    /// no new ones arrive. Idempotent.
    pub fn unsubscribe(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;

        let mut collections = lock(&self.inner.collections);
        if let Some(state) = collections.get_mut(&self.collection) {
            state.remove_watcher(self.watcher_id);
        }
        drop(collections);

        self.rx.close();
        tracing::debug!(
            collection = %self.collection,
            watcher_id = self.watcher_id,
            "subscription released"
        );
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
