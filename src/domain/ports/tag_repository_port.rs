//! Tag repository port definition.

use async_trait::async_trait;

use crate::domain::entities::Tag;
use crate::domain::errors::ApiError;

/// Typed access to tags.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Tags whose name starts with `prefix`, most used first.
    async fn search(&self, prefix: &str, limit: u32) -> Result<Vec<Tag>, ApiError>;
}
