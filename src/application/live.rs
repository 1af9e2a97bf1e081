//! Live query subscriptions.
//!
//! ```text
//! EntityStore write ──publish(Collection)──▶ broadcast::Sender<Collection>
//!                                                  │
//!                        ┌─────────────────────────┼──────────────┐
//!                        ▼                         ▼              ▼
//!                 subscription task         subscription task    ...
//!                 (re-query, on_change)     (re-query, on_change)
//! ```
//!
//! Writers only enqueue the name of the collection they touched. Each
//! subscription owns a task that re-runs its query on the blocking pool and
//! hands the full current result set to its callback, so a slow or failing
//! callback never reaches the writer.

use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

/// Change events buffered per subscriber before it lags. A lagging
/// subscriber re-queries once and carries on.
const FEED_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Shops,
    Products,
    Orders,
}

type Listener = Arc<dyn Fn() + Send + Sync>;

pub struct ChangeFeed {
    tx: broadcast::Sender<Collection>,
}

impl ChangeFeed {
    pub fn new() -> Arc<Self> {
        let (tx, _) = broadcast::channel(FEED_CAPACITY);
        Arc::new(ChangeFeed { tx })
    }

    /// Starts a task that runs `listener` once straight away and again after
    /// every change to `collection`. Must be called inside a Tokio runtime.
    pub(crate) fn register(
        &self,
        collection: Collection,
        listener: impl Fn() + Send + Sync + 'static,
    ) -> Subscription {
        // Subscribe before the first query so no write slips between them.
        let mut rx = self.tx.subscribe();
        let listener: Listener = Arc::new(listener);

        let task = tokio::spawn(async move {
            log::debug!("subscription opened on {collection:?}");
            refresh(&listener).await;
            loop {
                match rx.recv().await {
                    Ok(changed) if changed == collection => {}
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => {
                        log::debug!("subscription on {collection:?} skipped {skipped} changes");
                    }
                    Err(RecvError::Closed) => break,
                }
                refresh(&listener).await;
            }
        });

        Subscription { task }
    }

    pub(crate) fn publish(&self, collection: Collection) {
        // Err only means nobody is listening.
        let _ = self.tx.send(collection);
    }

    /// Number of open subscriptions.
    pub fn active(&self) -> usize {
        self.tx.receiver_count()
    }
}

async fn refresh(listener: &Listener) {
    let listener = Arc::clone(listener);
    if let Err(e) = tokio::task::spawn_blocking(move || listener()).await {
        if e.is_panic() {
            log::warn!("live query callback panicked; subscription kept open");
        }
    }
}

/// Handle to a live query. The query stays registered until the handle is
/// cancelled or dropped.
#[must_use = "dropping a subscription cancels it"]
pub struct Subscription {
    task: JoinHandle<()>,
}

impl Subscription {
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}
