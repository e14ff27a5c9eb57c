//! Search history persistence.

use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};

use super::config::AppConfig;
use crate::domain::ports::SearchHistoryStore;
use crate::domain::search::SearchHistory;

/// Stores [`SearchHistory`] as JSON in the user data directory.
#[derive(Debug, Clone)]
pub struct JsonHistoryStore {
    path: Option<PathBuf>,
}

impl Default for JsonHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonHistoryStore {
    /// Creates a store at the default location.
    ///
    /// If project directories cannot be determined, persistence will be disabled
    /// and a warning will be logged.
    #[must_use]
    pub fn new() -> Self {
        let path = AppConfig::search_history_path();
        if path.is_none() {
            warn!("Failed to determine project directories. Search history persistence disabled.");
        }
        Self { path }
    }

    /// Creates a store at a specific path.
    #[must_use]
    pub const fn with_path(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }
}

#[async_trait]
impl SearchHistoryStore for JsonHistoryStore {
    /// A malformed file is logged and replaced by an empty history. Lists
    /// are re-normalized on load.
    async fn load(&self) -> io::Result<SearchHistory> {
        let Some(path) = &self.path else {
            return Ok(SearchHistory::default());
        };

        if !fs::try_exists(path).await.unwrap_or(false) {
            return Ok(SearchHistory::default());
        }

        let content = fs::read(path).await?;

        match serde_json::from_slice::<SearchHistory>(&content) {
            Ok(mut history) => {
                history.normalize_lists();
                Ok(history)
            }
            Err(e) => {
                warn!(error = %e, "Failed to parse search history. Starting fresh.");
                Ok(SearchHistory::default())
            }
        }
    }

    async fn save(&self, history: &SearchHistory) -> io::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_vec_pretty(history)?;
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, content).await?;
        fs::rename(&temp_path, path).await?;

        debug!(path = %path.display(), "Saved search history");
        Ok(())
    }
}
