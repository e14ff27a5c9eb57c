//! Authenticated post actions.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::services::Session;
use crate::domain::entities::{Comment, Post};
use crate::domain::errors::ApiError;
use crate::domain::ports::PostRepository;

/// Favorite, vote and comment on posts.
///
/// A 401/403 from any action marks the session as needing
/// re-authentication before the error is returned.
pub struct PostActionsUseCase {
    posts: Arc<dyn PostRepository>,
    session: Arc<Session>,
}

impl PostActionsUseCase {
    /// Creates new use case.
    #[must_use]
    pub fn new(posts: Arc<dyn PostRepository>, session: Arc<Session>) -> Self {
        Self { posts, session }
    }

    /// Favorites `post` and returns its updated copy.
    ///
    /// # Errors
    /// Returns the repository error.
    pub async fn favorite(&self, post: &Post) -> Result<Post, ApiError> {
        debug!(post_id = %post.id, "Adding favorite");
        self.guard(self.posts.favorite(post.id).await)?;
        Ok(post.with_favorited(true))
    }

    /// Removes `post` from favorites and returns its updated copy.
    ///
    /// # Errors
    /// Returns the repository error.
    pub async fn unfavorite(&self, post: &Post) -> Result<Post, ApiError> {
        debug!(post_id = %post.id, "Removing favorite");
        self.guard(self.posts.unfavorite(post.id).await)?;
        Ok(post.with_favorited(false))
    }

    /// Votes on `post` and returns its updated copy.
    ///
    /// # Errors
    /// Returns the repository error.
    pub async fn vote(&self, post: &Post, score: i32) -> Result<Post, ApiError> {
        debug!(post_id = %post.id, score, "Voting");
        self.guard(self.posts.vote(post.id, score).await)?;
        Ok(post.with_vote(score))
    }

    /// Posts a comment on `post`.
    ///
    /// # Errors
    /// Returns the repository error.
    pub async fn comment(&self, post: &Post, body: &str) -> Result<Comment, ApiError> {
        debug!(post_id = %post.id, "Posting comment");
        self.guard(self.posts.create_comment(post.id, body).await)
    }

    fn guard<T>(&self, result: Result<T, ApiError>) -> Result<T, ApiError> {
        if let Err(e) = &result
            && e.is_auth_failure()
        {
            warn!(error = %e, "Server rejected credentials");
            self.session.invalidate();
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::SessionState;
    use crate::domain::entities::{PostId, UserProfile};
    use crate::domain::ports::mocks::MockPostRepository;
    use mockall::predicate::eq;
    use test_case::test_case;

    fn post() -> Post {
        let mut post = Post::new(42);
        post.fav_count = Some(5);
        post.score = Some(10);
        post.up_score = Some(12);
        post.down_score = Some(-2);
        post
    }

    fn authenticated() -> Arc<Session> {
        let session = Arc::new(Session::new());
        session.authenticate(UserProfile::new(1, "alice"));
        session
    }

    #[tokio::test]
    async fn test_favorite_returns_optimistic_copy() {
        let mut posts = MockPostRepository::new();
        posts
            .expect_favorite()
            .with(eq(PostId(42)))
            .times(1)
            .returning(|_| Ok(()));

        let use_case = PostActionsUseCase::new(Arc::new(posts), authenticated());
        let updated = use_case.favorite(&post()).await.unwrap();

        assert_eq!(updated.is_favorited, Some(true));
        assert_eq!(updated.fav_count, Some(6));
    }

    #[tokio::test]
    async fn test_unfavorite_returns_optimistic_copy() {
        let mut posts = MockPostRepository::new();
        posts.expect_unfavorite().returning(|_| Ok(()));

        let mut favorited = post();
        favorited.is_favorited = Some(true);

        let use_case = PostActionsUseCase::new(Arc::new(posts), authenticated());
        let updated = use_case.unfavorite(&favorited).await.unwrap();

        assert_eq!(updated.is_favorited, Some(false));
        assert_eq!(updated.fav_count, Some(4));
    }

    #[tokio::test]
    async fn test_vote_updates_tallies() {
        let mut posts = MockPostRepository::new();
        posts
            .expect_vote()
            .with(eq(PostId(42)), eq(-1))
            .returning(|_, _| Ok(()));

        let use_case = PostActionsUseCase::new(Arc::new(posts), authenticated());
        let updated = use_case.vote(&post(), -1).await.unwrap();

        assert_eq!(updated.score, Some(9));
        assert_eq!(updated.down_score, Some(-3));
        assert_eq!(updated.up_score, Some(12));
    }

    #[tokio::test]
    async fn test_comment_passes_body_through() {
        let mut posts = MockPostRepository::new();
        posts
            .expect_create_comment()
            .withf(|id, body| *id == PostId(42) && body == "nice & clean")
            .returning(|id, body| {
                Ok(Comment {
                    id: 9,
                    post_id: id,
                    creator_id: Some(1),
                    creator_name: Some("alice".to_string()),
                    body: body.to_string(),
                    created_at: None,
                })
            });

        let use_case = PostActionsUseCase::new(Arc::new(posts), authenticated());
        let comment = use_case.comment(&post(), "nice & clean").await.unwrap();

        assert_eq!(comment.id, 9);
        assert_eq!(comment.body, "nice & clean");
    }

    #[test_case(401, SessionState::NeedsReauthentication ; "unauthorized")]
    #[test_case(403, SessionState::NeedsReauthentication ; "forbidden")]
    #[test_case(500, SessionState::Authenticated(UserProfile::new(1, "alice")) ; "server error")]
    #[tokio::test]
    async fn test_failures_and_session(status: u16, expected: SessionState) {
        let mut posts = MockPostRepository::new();
        posts
            .expect_favorite()
            .returning(move |_| Err(ApiError::ServerError { status }));

        let session = authenticated();
        let use_case = PostActionsUseCase::new(Arc::new(posts), session.clone());

        let result = use_case.favorite(&post()).await;

        assert!(matches!(result, Err(ApiError::ServerError { status: s }) if s == status));
        assert_eq!(session.state(), expected);
    }

    #[tokio::test]
    async fn test_network_error_keeps_session() {
        let mut posts = MockPostRepository::new();
        posts.expect_vote().returning(|_, _| {
            Err(ApiError::transport(
                crate::domain::errors::TransportErrorKind::Offline,
                "unreachable",
            ))
        });

        let session = authenticated();
        let use_case = PostActionsUseCase::new(Arc::new(posts), session.clone());

        assert!(use_case.vote(&post(), 1).await.is_err());
        assert!(session.is_authenticated());
    }
}
