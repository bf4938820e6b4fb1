//! Landing-page aggregator: total task and comment counts, cached for one
//! revalidation window.
//!
//! Both counts must succeed for a render — there is no partial display. A
//! background task refreshes the cache on the same interval so most
//! requests never pay for the fetch.

use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use taskpad_app::{COMMENTS_COLLECTION, TASKS_COLLECTION};
use taskpad_store::Store;

use crate::error::ServerError;

/// Aggregate counts shown on the landing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LandingStats {
    pub tasks: u64,
    pub comments: u64,
}

/// TTL cache over the aggregate counts.
pub struct StatsCache {
    ttl: Duration,
    cached: Mutex<Option<(Instant, LandingStats)>>,
}

impl StatsCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            cached: Mutex::new(None),
        }
    }

    /// Counts for the current revalidation window, fetching when the cache
    /// is cold or expired.
    pub async fn get(&self, store: &Store) -> Result<LandingStats, ServerError> {
        let mut cached = self.cached.lock().await;
        if let Some((fetched_at, stats)) = *cached {
            if fetched_at.elapsed() < self.ttl {
                return Ok(stats);
            }
        }

        let stats = fetch(store).await?;
        *cached = Some((Instant::now(), stats));
        Ok(stats)
    }

    /// Force a fetch, replacing whatever is cached. Used by the background
    /// revalidation task.
    pub async fn refresh(&self, store: &Store) -> Result<LandingStats, ServerError> {
        let stats = fetch(store).await?;
        let mut cached = self.cached.lock().await;
        *cached = Some((Instant::now(), stats));
        Ok(stats)
    }
}

async fn fetch(store: &Store) -> Result<LandingStats, ServerError> {
    let tasks = store.collection(TASKS_COLLECTION).count().await? as u64;
    let comments = store.collection(COMMENTS_COLLECTION).count().await? as u64;
    Ok(LandingStats { tasks, comments })
}
