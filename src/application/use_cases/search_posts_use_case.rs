//! Post search use case.

use std::sync::Arc;

use tracing::debug;

use crate::application::services::SearchHistoryService;
use crate::domain::entities::Post;
use crate::domain::errors::ApiError;
use crate::domain::ports::PostRepository;

/// Routes a raw search box query to the right repository call.
pub struct SearchPostsUseCase {
    posts: Arc<dyn PostRepository>,
    history: Option<Arc<SearchHistoryService>>,
}

impl SearchPostsUseCase {
    /// Creates the use case without history recording.
    #[must_use]
    pub fn new(posts: Arc<dyn PostRepository>) -> Self {
        Self {
            posts,
            history: None,
        }
    }

    /// Records successful non-empty searches in `history`.
    #[must_use]
    pub fn with_history(mut self, history: Arc<SearchHistoryService>) -> Self {
        self.history = Some(history);
        self
    }

    /// Runs the search.
    ///
    /// The query is trimmed; a non-empty result is passed to the tag search
    /// with internal whitespace intact, anything else lists recent posts.
    ///
    /// # Errors
    /// Returns the repository error unchanged.
    pub async fn execute(
        &self,
        query: Option<&str>,
        page: u32,
        limit: u32,
    ) -> Result<Vec<Post>, ApiError> {
        let trimmed = query.map(str::trim).filter(|q| !q.is_empty());

        let Some(tags) = trimmed else {
            debug!(page, "Listing recent posts");
            return self.posts.recent(page, limit).await;
        };

        debug!(tags, page, "Searching posts by tags");
        let posts = self.posts.by_tags(tags, page, limit).await?;
        if let Some(history) = &self.history {
            history.record(tags).await;
        }
        Ok(posts)
    }
}
