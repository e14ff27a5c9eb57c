//! API-backed repository implementations.

use std::sync::Arc;

use async_trait::async_trait;

use super::client::BooruClient;
use crate::domain::entities::{Comment, Credentials, Post, PostId, Tag, UserProfile};
use crate::domain::errors::ApiError;
use crate::domain::ports::{AccountRepository, PostRepository, TagRepository};

/// Post repository backed by [`BooruClient`].
#[derive(Debug, Clone)]
pub struct ApiPostRepository {
    client: Arc<BooruClient>,
}

impl ApiPostRepository {
    #[must_use]
    pub const fn new(client: Arc<BooruClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PostRepository for ApiPostRepository {
    async fn recent(&self, page: u32, limit: u32) -> Result<Vec<Post>, ApiError> {
        self.client.fetch_posts(None, page, limit).await
    }

    async fn by_tags(&self, query: &str, page: u32, limit: u32) -> Result<Vec<Post>, ApiError> {
        self.client.fetch_posts(Some(query), page, limit).await
    }

    async fn get(&self, id: PostId) -> Result<Post, ApiError> {
        self.client.fetch_post(id).await
    }

    async fn favorite(&self, id: PostId) -> Result<(), ApiError> {
        self.client.favorite(id).await
    }

    async fn unfavorite(&self, id: PostId) -> Result<(), ApiError> {
        self.client.unfavorite(id).await
    }

    async fn vote(&self, id: PostId, score: i32) -> Result<(), ApiError> {
        self.client.vote(id, score).await
    }

    async fn comments(&self, id: PostId, limit: u32) -> Result<Vec<Comment>, ApiError> {
        self.client.fetch_comments(id, limit).await
    }

    async fn create_comment(&self, id: PostId, body: &str) -> Result<Comment, ApiError> {
        self.client.create_comment(id, body).await
    }
}

/// Tag repository backed by [`BooruClient`].
#[derive(Debug, Clone)]
pub struct ApiTagRepository {
    client: Arc<BooruClient>,
}

impl ApiTagRepository {
    #[must_use]
    pub const fn new(client: Arc<BooruClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TagRepository for ApiTagRepository {
    async fn search(&self, prefix: &str, limit: u32) -> Result<Vec<Tag>, ApiError> {
        self.client.fetch_tags(prefix, limit).await
    }
}

/// Account repository backed by [`BooruClient`].
#[derive(Debug, Clone)]
pub struct ApiAccountRepository {
    client: Arc<BooruClient>,
}

impl ApiAccountRepository {
    #[must_use]
    pub const fn new(client: Arc<BooruClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AccountRepository for ApiAccountRepository {
    async fn current_user(&self) -> Result<UserProfile, ApiError> {
        self.client.fetch_current_user().await
    }

    fn apply_credentials(&self, credentials: &Credentials) {
        self.client.set_credentials(credentials);
    }

    fn active_credentials(&self) -> Credentials {
        self.client.credentials()
    }
}
