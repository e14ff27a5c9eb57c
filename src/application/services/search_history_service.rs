//! In-memory search history backed by a persistence port.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::domain::ports::SearchHistoryStore;
use crate::domain::search::{SearchHistory, SearchKind};

/// Owns the search history and writes every change through to the store.
///
/// The history is loaded lazily on first use. Persistence failures are
/// logged and never fail the caller.
pub struct SearchHistoryService {
    store: Arc<dyn SearchHistoryStore>,
    history: Mutex<Option<SearchHistory>>,
}

impl std::fmt::Debug for SearchHistoryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchHistoryService").finish_non_exhaustive()
    }
}

impl SearchHistoryService {
    /// Creates the service; nothing is read until first use.
    #[must_use]
    pub fn new(store: Arc<dyn SearchHistoryStore>) -> Self {
        Self {
            store,
            history: Mutex::new(None),
        }
    }

    /// Returns a copy of the current history.
    pub async fn snapshot(&self) -> SearchHistory {
        self.with_history(|_| false).await
    }

    /// Records a query that was just run.
    pub async fn record(&self, query: &str) {
        let now = Utc::now().timestamp_millis();
        self.with_history(|h| {
            h.record_recent(query, now);
            true
        })
        .await;
    }

    /// Saves a query for later.
    pub async fn save(&self, query: &str) {
        let now = Utc::now().timestamp_millis();
        self.with_history(|h| {
            h.save(query, now);
            true
        })
        .await;
    }

    /// Pins or unpins a saved query.
    pub async fn set_pinned(&self, query: &str, pinned: bool) -> bool {
        let mut changed = false;
        self.with_history(|h| {
            changed = h.set_pinned(query, pinned);
            changed
        })
        .await;
        changed
    }

    /// Removes a query from one list.
    pub async fn remove(&self, query: &str, kind: SearchKind) -> bool {
        let mut removed = false;
        self.with_history(|h| {
            removed = h.remove(query, kind);
            removed
        })
        .await;
        removed
    }

    /// Forgets all recent queries.
    pub async fn clear_recent(&self) {
        self.with_history(|h| {
            h.clear_recent();
            true
        })
        .await;
    }

    /// Applies `update` to the loaded history, persisting when it returns
    /// true, and returns the resulting history.
    async fn with_history<F>(&self, update: F) -> SearchHistory
    where
        F: FnOnce(&mut SearchHistory) -> bool,
    {
        let mut guard = self.history.lock().await;
        if guard.is_none() {
            let loaded = self.store.load().await.unwrap_or_else(|e| {
                warn!(error = %e, "Failed to load search history");
                SearchHistory::default()
            });
            debug!(
                recent = loaded.recent().len(),
                saved = loaded.saved().len(),
                "Loaded search history"
            );
            *guard = Some(loaded);
        }

        let history = guard.get_or_insert_with(SearchHistory::default);
        if update(history)
            && let Err(e) = self.store.save(history).await
        {
            warn!(error = %e, "Failed to persist search history");
        }
        history.clone()
    }
}
