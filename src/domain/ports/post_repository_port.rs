//! Post repository port definition.

use async_trait::async_trait;

use crate::domain::entities::{Comment, Post, PostId};
use crate::domain::errors::ApiError;

/// Typed access to posts and the actions performed on them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Most recent posts.
    async fn recent(&self, page: u32, limit: u32) -> Result<Vec<Post>, ApiError>;

    /// Posts matching a tag query.
    async fn by_tags(&self, query: &str, page: u32, limit: u32) -> Result<Vec<Post>, ApiError>;

    /// A single post.
    async fn get(&self, id: PostId) -> Result<Post, ApiError>;

    /// Adds the post to the user's favorites.
    async fn favorite(&self, id: PostId) -> Result<(), ApiError>;

    /// Removes the post from the user's favorites.
    async fn unfavorite(&self, id: PostId) -> Result<(), ApiError>;

    /// Votes on the post.
    async fn vote(&self, id: PostId, score: i32) -> Result<(), ApiError>;

    /// Comments on the post.
    async fn comments(&self, id: PostId, limit: u32) -> Result<Vec<Comment>, ApiError>;

    /// Posts a comment.
    async fn create_comment(&self, id: PostId, body: &str) -> Result<Comment, ApiError>;
}
