//! Content API HTTP client.

use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose};
use parking_lot::RwLock;
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use super::dto::{CommentResponse, ErrorResponse, PostResponse, TagResponse, UserResponse};
use super::transport::{ACCEPT_JSON, HttpMethod, HttpRequest, HttpResponse, HttpTransport};
use super::url_resolver::UrlResolver;
use crate::domain::entities::{Comment, Credentials, Post, PostId, Tag, UserProfile};
use crate::domain::errors::ApiError;

/// Base URL and authentication derived from [`Credentials`].
#[derive(Clone)]
pub struct ApiConfig {
    base_url: Url,
    credentials: Credentials,
    authorization: Option<Zeroizing<String>>,
}

impl ApiConfig {
    /// Creates an unauthenticated configuration.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self::from_credentials(base_url, &Credentials::empty())
    }

    /// Derives the configuration from credentials. Unusable credentials
    /// yield an unauthenticated configuration.
    #[must_use]
    pub fn from_credentials(base_url: Url, credentials: &Credentials) -> Self {
        let authorization = match (credentials.username(), credentials.api_key()) {
            (Some(user), Some(key)) => {
                let pair = Zeroizing::new(format!("{user}:{key}"));
                Some(Zeroizing::new(format!(
                    "Basic {}",
                    general_purpose::STANDARD.encode(pair.as_bytes())
                )))
            }
            _ => None,
        };

        Self {
            base_url,
            credentials: credentials.clone(),
            authorization,
        }
    }

    /// Returns the base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns true when requests can be authenticated.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.authorization.is_some()
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(path);
        url.set_query(None);
        url
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(super::default_content_host())
    }
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    None,
    Required,
}

/// Content API client.
pub struct BooruClient {
    transport: Arc<dyn HttpTransport>,
    resolver: UrlResolver,
    config: RwLock<ApiConfig>,
}

impl std::fmt::Debug for BooruClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BooruClient")
            .field("config", &*self.config.read())
            .finish_non_exhaustive()
    }
}

impl BooruClient {
    /// Creates a client; media URLs resolve against the base URL.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>, config: ApiConfig) -> Self {
        let resolver = UrlResolver::new(config.base_url().clone());
        Self {
            transport,
            resolver,
            config: RwLock::new(config),
        }
    }

    /// Returns the URL resolver.
    #[must_use]
    pub const fn resolver(&self) -> &UrlResolver {
        &self.resolver
    }

    /// Replaces the credentials used for subsequent requests.
    pub fn set_credentials(&self, credentials: &Credentials) {
        let mut config = self.config.write();
        *config = ApiConfig::from_credentials(config.base_url().clone(), credentials);
        debug!(authenticated = config.is_authenticated(), "API credentials updated");
    }

    /// Returns the credentials currently in use.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        self.config.read().credentials.clone()
    }

    /// Returns true when authenticated operations can be attempted.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        self.config.read().is_authenticated()
    }

    fn endpoint(&self, path: &str) -> Url {
        self.config.read().endpoint(path)
    }

    async fn execute(&self, request: HttpRequest, auth: Auth) -> Result<HttpResponse, ApiError> {
        let authorization = match auth {
            Auth::None => None,
            Auth::Required => {
                let config = self.config.read();
                let Some(header) = config.authorization.as_ref() else {
                    debug!(url = %request.url, "Refusing authenticated request without credentials");
                    return Err(ApiError::MissingCredentials);
                };
                Some(header.to_string())
            }
        };

        debug!(method = ?request.method, url = %request.url, "API request");

        let response = self
            .transport
            .send(request.with_authorization(authorization))
            .await?;

        if !response.is_success() {
            let detail = serde_json::from_slice::<ErrorResponse>(&response.body)
                .ok()
                .and_then(|e| e.message.or(e.reason))
                .unwrap_or_default();
            warn!(status = response.status, detail = %detail, "API returned error status");
            return Err(ApiError::ServerError {
                status: response.status,
            });
        }

        Ok(response)
    }

    fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
        serde_json::from_slice(&response.body).map_err(|e| {
            warn!(error = %e, "Failed to decode API response");
            ApiError::decoding(e.to_string())
        })
    }

    /// Fetches a page of posts, optionally filtered by a tag query.
    ///
    /// # Errors
    /// Returns error on transport failure, non-success status or malformed body.
    pub async fn fetch_posts(
        &self,
        tags: Option<&str>,
        page: u32,
        limit: u32,
    ) -> Result<Vec<Post>, ApiError> {
        let mut url = self.endpoint("/posts.json");
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("page", &page.to_string());
            query.append_pair("limit", &limit.to_string());
            if let Some(tags) = tags {
                query.append_pair("tags", tags);
            }
        }

        let response = self
            .execute(HttpRequest::get(url, ACCEPT_JSON), Auth::None)
            .await?;
        let posts: Vec<PostResponse> = Self::decode(&response)?;
        let posts = posts
            .into_iter()
            .map(|p| p.into_post(&self.resolver))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = posts.len(), page, "Fetched posts");
        Ok(posts)
    }

    /// Fetches a single post.
    ///
    /// # Errors
    /// Returns error on transport failure, non-success status or malformed body.
    pub async fn fetch_post(&self, id: PostId) -> Result<Post, ApiError> {
        let url = self.endpoint(&format!("/posts/{id}.json"));
        let response = self
            .execute(HttpRequest::get(url, ACCEPT_JSON), Auth::None)
            .await?;
        Self::decode::<PostResponse>(&response)?.into_post(&self.resolver)
    }

    /// Fetches tags starting with `prefix`, most used first.
    ///
    /// An empty prefix returns an empty list without a request.
    ///
    /// # Errors
    /// Returns error on transport failure, non-success status or malformed body.
    pub async fn fetch_tags(&self, prefix: &str, limit: u32) -> Result<Vec<Tag>, ApiError> {
        if prefix.is_empty() {
            return Ok(Vec::new());
        }

        let mut url = self.endpoint("/tags.json");
        url.query_pairs_mut()
            .append_pair("search[name_matches]", &format!("{prefix}*"))
            .append_pair("limit", &limit.to_string())
            .append_pair("search[order]", "count");

        let response = self
            .execute(HttpRequest::get(url, ACCEPT_JSON), Auth::None)
            .await?;
        let tags: Vec<TagResponse> = Self::decode(&response)?;
        Ok(tags.into_iter().map(Tag::from).collect())
    }

    /// Adds a post to the user's favorites.
    ///
    /// # Errors
    /// Returns [`ApiError::MissingCredentials`] without credentials, or the
    /// request failure.
    pub async fn favorite(&self, id: PostId) -> Result<(), ApiError> {
        let request = HttpRequest::get(self.endpoint("/favorites.json"), ACCEPT_JSON)
            .with_method(HttpMethod::Post)
            .with_form_field("post_id", id.to_string());
        self.execute(request, Auth::Required).await?;
        debug!(post_id = %id, "Favorited post");
        Ok(())
    }

    /// Removes a post from the user's favorites.
    ///
    /// # Errors
    /// Returns [`ApiError::MissingCredentials`] without credentials, or the
    /// request failure.
    pub async fn unfavorite(&self, id: PostId) -> Result<(), ApiError> {
        let request = HttpRequest::get(self.endpoint(&format!("/favorites/{id}.json")), ACCEPT_JSON)
            .with_method(HttpMethod::Delete);
        self.execute(request, Auth::Required).await?;
        debug!(post_id = %id, "Unfavorited post");
        Ok(())
    }

    /// Votes on a post.
    ///
    /// # Errors
    /// Returns [`ApiError::MissingCredentials`] without credentials, or the
    /// request failure.
    pub async fn vote(&self, id: PostId, score: i32) -> Result<(), ApiError> {
        let request =
            HttpRequest::get(self.endpoint(&format!("/posts/{id}/votes.json")), ACCEPT_JSON)
                .with_method(HttpMethod::Post)
                .with_form_field("score", score.to_string());
        self.execute(request, Auth::Required).await?;
        debug!(post_id = %id, score, "Voted on post");
        Ok(())
    }

    /// Fetches comments on a post.
    ///
    /// # Errors
    /// Returns error on transport failure, non-success status or malformed body.
    pub async fn fetch_comments(&self, id: PostId, limit: u32) -> Result<Vec<Comment>, ApiError> {
        let mut url = self.endpoint("/comments.json");
        url.query_pairs_mut()
            .append_pair("search[post_id]", &id.to_string())
            .append_pair("limit", &limit.to_string());

        let response = self
            .execute(HttpRequest::get(url, ACCEPT_JSON), Auth::None)
            .await?;
        let comments: Vec<CommentResponse> = Self::decode(&response)?;
        Ok(comments.into_iter().map(Comment::from).collect())
    }

    /// Posts a comment and returns it as created.
    ///
    /// # Errors
    /// Returns [`ApiError::MissingCredentials`] without credentials, or the
    /// request failure.
    pub async fn create_comment(&self, id: PostId, body: &str) -> Result<Comment, ApiError> {
        let request = HttpRequest::get(self.endpoint("/comments.json"), ACCEPT_JSON)
            .with_method(HttpMethod::Post)
            .with_form_field("comment[post_id]", id.to_string())
            .with_form_field("comment[body]", body);
        let response = self.execute(request, Auth::Required).await?;
        let comment: CommentResponse = Self::decode(&response)?;
        debug!(post_id = %id, comment_id = comment.id, "Created comment");
        Ok(comment.into())
    }

    /// Fetches the profile of the authenticated user.
    ///
    /// # Errors
    /// Returns [`ApiError::MissingCredentials`] without credentials, or the
    /// request failure.
    pub async fn fetch_current_user(&self) -> Result<UserProfile, ApiError> {
        let request = HttpRequest::get(self.endpoint("/profile.json"), ACCEPT_JSON);
        let response = self.execute(request, Auth::Required).await?;
        let user: UserResponse = Self::decode(&response)?;
        debug!(user_id = user.id, username = %user.name, "Fetched current user");
        Ok(user.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Rating;
    use crate::infrastructure::api::transport::MockHttpTransport;

    fn client_with(transport: MockHttpTransport) -> BooruClient {
        BooruClient::new(Arc::new(transport), ApiConfig::default())
    }

    fn authed_client(transport: MockHttpTransport) -> BooruClient {
        let client = client_with(transport);
        client.set_credentials(&Credentials::from_parts("alice", "key123"));
        client
    }

    fn query_value(url: &Url, key: &str) -> Option<String> {
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    #[tokio::test]
    async fn test_decode_post_array() {
        let mut transport = MockHttpTransport::new();
        transport.expect_send().times(1).returning(|request| {
            assert_eq!(request.url.path(), "/posts.json");
            assert!(request.authorization.is_none());
            Ok(HttpResponse::new(
                200,
                r#"[{"id":123,"rating":"s","score":42,"fav_count":3,"is_favorited":true,
                    "up_score":123,"down_score":5,
                    "created_at":"2024-03-01T12:00:00.000-05:00",
                    "file_url":"/data/original/x.png",
                    "preview_file_url":"https://cdn.donmai.us/preview/x.jpg"}]"#,
            ))
        });

        let posts = client_with(transport).fetch_posts(None, 1, 20).await.unwrap();

        assert_eq!(posts.len(), 1);
        let post = &posts[0];
        assert_eq!(post.id, PostId(123));
        assert_eq!(post.rating, Some(Rating::Sensitive));
        assert_eq!(post.score, Some(42));
        assert_eq!(post.fav_count, Some(3));
        assert_eq!(post.is_favorited, Some(true));
        assert_eq!(post.up_score, Some(123));
        assert_eq!(post.down_score, Some(5));
        assert!(post.created_at.is_some());
        assert_eq!(
            post.file_url.as_deref(),
            Some("https://danbooru.donmai.us/data/original/x.png")
        );
        assert_eq!(
            post.preview_url.as_deref(),
            Some("https://cdn.donmai.us/preview/x.jpg")
        );
    }

    #[tokio::test]
    async fn test_fetch_posts_query_parameters() {
        let mut transport = MockHttpTransport::new();
        transport.expect_send().times(1).returning(|request| {
            assert_eq!(query_value(&request.url, "page").as_deref(), Some("3"));
            assert_eq!(query_value(&request.url, "limit").as_deref(), Some("50"));
            assert_eq!(
                query_value(&request.url, "tags").as_deref(),
                Some("cat_ears rating:g")
            );
            assert_eq!(request.accept, ACCEPT_JSON);
            Ok(HttpResponse::new(200, "[]"))
        });

        let posts = client_with(transport)
            .fetch_posts(Some("cat_ears rating:g"), 3, 50)
            .await
            .unwrap();
        assert!(posts.is_empty());
    }

    #[tokio::test]
    async fn test_non_success_status_is_server_error() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .returning(|_| Ok(HttpResponse::new(502, r#"{"message":"bad gateway"}"#)));

        let result = client_with(transport).fetch_posts(None, 1, 20).await;
        assert!(matches!(result, Err(ApiError::ServerError { status: 502 })));
    }

    #[tokio::test]
    async fn test_malformed_body_is_decoding_error() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .returning(|_| Ok(HttpResponse::new(200, r#"{"not":"an array"}"#)));

        let result = client_with(transport).fetch_posts(None, 1, 20).await;
        assert!(matches!(result, Err(ApiError::Decoding { .. })));
    }

    #[tokio::test]
    async fn test_invalid_date_is_decoding_error() {
        let mut transport = MockHttpTransport::new();
        transport.expect_send().returning(|_| {
            Ok(HttpResponse::new(
                200,
                r#"[{"id":1,"created_at":"March 1st"}]"#,
            ))
        });

        let result = client_with(transport).fetch_posts(None, 1, 20).await;
        assert!(matches!(result, Err(ApiError::Decoding { .. })));
    }

    #[tokio::test]
    async fn test_transport_errors_propagate() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .returning(|_| Err(ApiError::InvalidResponse));

        let result = client_with(transport).fetch_post(PostId(1)).await;
        assert!(matches!(result, Err(ApiError::InvalidResponse)));
    }

    #[tokio::test]
    async fn test_empty_tag_prefix_skips_network() {
        let mut transport = MockHttpTransport::new();
        transport.expect_send().times(0);

        let tags = client_with(transport).fetch_tags("", 10).await.unwrap();
        assert!(tags.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_tags_query() {
        let mut transport = MockHttpTransport::new();
        transport.expect_send().times(1).returning(|request| {
            assert_eq!(request.url.path(), "/tags.json");
            assert_eq!(
                query_value(&request.url, "search[name_matches]").as_deref(),
                Some("hat*")
            );
            assert_eq!(
                query_value(&request.url, "search[order]").as_deref(),
                Some("count")
            );
            Ok(HttpResponse::new(
                200,
                r#"[{"name":"hat","category":0,"post_count":900}]"#,
            ))
        });

        let tags = client_with(transport).fetch_tags("hat", 10).await.unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "hat");
    }

    #[tokio::test]
    async fn test_favorite_without_credentials_sends_nothing() {
        let mut transport = MockHttpTransport::new();
        transport.expect_send().times(0);
        let client = client_with(transport);

        let result = client.favorite(PostId(1)).await;
        assert!(matches!(result, Err(ApiError::MissingCredentials)));

        client.set_credentials(&Credentials::new(Some("alice"), Some("  ")));
        let result = client.vote(PostId(1), 1).await;
        assert!(matches!(result, Err(ApiError::MissingCredentials)));
    }

    #[tokio::test]
    async fn test_favorite_sends_basic_auth_and_form() {
        let mut transport = MockHttpTransport::new();
        transport.expect_send().times(1).returning(|request| {
            assert_eq!(request.method, HttpMethod::Post);
            assert_eq!(request.url.path(), "/favorites.json");
            assert_eq!(request.url.query(), None);
            assert_eq!(
                request.authorization.as_deref(),
                Some("Basic YWxpY2U6a2V5MTIz")
            );
            assert_eq!(
                request.form,
                vec![("post_id".to_string(), "42".to_string())]
            );
            Ok(HttpResponse::new(201, ""))
        });

        authed_client(transport).favorite(PostId(42)).await.unwrap();
    }

    #[tokio::test]
    async fn test_unfavorite_and_vote_endpoints() {
        let mut transport = MockHttpTransport::new();
        transport.expect_send().times(2).returning(|request| {
            match request.method {
                HttpMethod::Delete => assert_eq!(request.url.path(), "/favorites/42.json"),
                HttpMethod::Post => {
                    assert_eq!(request.url.path(), "/posts/42/votes.json");
                    assert_eq!(request.form, vec![("score".to_string(), "-1".to_string())]);
                }
                HttpMethod::Get => panic!("unexpected GET"),
            }
            Ok(HttpResponse::new(204, ""))
        });

        let client = authed_client(transport);
        client.unfavorite(PostId(42)).await.unwrap();
        client.vote(PostId(42), -1).await.unwrap();
    }

    #[tokio::test]
    async fn test_auth_rejection_is_server_error() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .returning(|_| Ok(HttpResponse::new(401, "")));

        let result = authed_client(transport).favorite(PostId(1)).await;
        let err = result.unwrap_err();
        assert!(err.is_auth_failure());
    }

    #[tokio::test]
    async fn test_comments() {
        let mut transport = MockHttpTransport::new();
        transport.expect_send().times(2).returning(|request| {
            if request.method == HttpMethod::Get {
                assert!(request.authorization.is_none());
                assert_eq!(
                    query_value(&request.url, "search[post_id]").as_deref(),
                    Some("9")
                );
                Ok(HttpResponse::new(
                    200,
                    r#"[{"id":1,"post_id":9,"creator_id":2,"body":"nice","created_at":"2024-01-01T00:00:00Z"}]"#,
                ))
            } else {
                assert!(request.authorization.is_some());
                assert!(request.form.contains(&(
                    "comment[body]".to_string(),
                    "hello & welcome".to_string()
                )));
                Ok(HttpResponse::new(
                    201,
                    r#"{"id":2,"post_id":9,"body":"hello & welcome"}"#,
                ))
            }
        });

        let client = authed_client(transport);
        let comments = client.fetch_comments(PostId(9), 20).await.unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].body, "nice");

        let created = client
            .create_comment(PostId(9), "hello & welcome")
            .await
            .unwrap();
        assert_eq!(created.id, 2);
        assert_eq!(created.post_id, PostId(9));
    }

    #[tokio::test]
    async fn test_fetch_current_user() {
        let mut transport = MockHttpTransport::new();
        transport.expect_send().times(1).returning(|request| {
            assert_eq!(request.url.path(), "/profile.json");
            Ok(HttpResponse::new(
                200,
                r#"{"id":77,"name":"alice","level_string":"Gold","created_at":"2020-05-05T10:00:00.123+00:00"}"#,
            ))
        });

        let user = authed_client(transport).fetch_current_user().await.unwrap();
        assert_eq!(user.id, 77);
        assert_eq!(user.level.as_deref(), Some("Gold"));
    }
}
