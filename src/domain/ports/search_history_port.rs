//! Search history persistence port.

use async_trait::async_trait;

use crate::domain::search::SearchHistory;

/// Port for loading and saving [`SearchHistory`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchHistoryStore: Send + Sync {
    /// Loads the persisted history. Missing data yields an empty history.
    async fn load(&self) -> std::io::Result<SearchHistory>;

    /// Replaces the persisted history.
    async fn save(&self, history: &SearchHistory) -> std::io::Result<()>;
}
