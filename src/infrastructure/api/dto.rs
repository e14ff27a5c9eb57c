//! Wire representations of API payloads and their conversion to entities.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::url_resolver::UrlResolver;
use crate::domain::entities::{
    CategorizedTags, Comment, Post, PostId, Rating, Tag, TagKind, UserProfile,
};
use crate::domain::errors::ApiError;
use crate::domain::serde_utils::iso8601_option;

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// `/posts.json` element.
#[derive(Debug, Deserialize)]
pub struct PostResponse {
    pub id: i64,
    #[serde(default, with = "iso8601_option")]
    pub created_at: Option<DateTime<Utc>>,
    pub rating: Option<String>,
    pub tag_string: Option<String>,
    pub tag_string_artist: Option<String>,
    pub tag_string_copyright: Option<String>,
    pub tag_string_character: Option<String>,
    pub tag_string_general: Option<String>,
    pub tag_string_meta: Option<String>,
    pub file_url: Option<String>,
    pub preview_file_url: Option<String>,
    pub large_file_url: Option<String>,
    pub image_width: Option<u32>,
    pub image_height: Option<u32>,
    pub score: Option<i64>,
    pub fav_count: Option<i64>,
    pub up_score: Option<i64>,
    pub down_score: Option<i64>,
    pub is_favorited: Option<bool>,
    pub source: Option<String>,
}

impl PostResponse {
    /// Converts to a [`Post`], resolving media URLs.
    ///
    /// # Errors
    /// Returns [`ApiError::Decoding`] for an unrecognized rating.
    pub fn into_post(self, resolver: &UrlResolver) -> Result<Post, ApiError> {
        let rating = match non_blank(self.rating) {
            Some(code) => Some(Rating::from_code(&code).ok_or_else(|| {
                ApiError::decoding(format!("unknown rating `{code}` on post {}", self.id))
            })?),
            None => None,
        };
        let resolve = |url: Option<String>| url.and_then(|u| resolver.resolve(&u));

        Ok(Post {
            id: PostId(self.id),
            created_at: self.created_at,
            rating,
            tag_string: non_blank(self.tag_string),
            categorized_tags: CategorizedTags {
                artist: non_blank(self.tag_string_artist),
                copyright: non_blank(self.tag_string_copyright),
                character: non_blank(self.tag_string_character),
                general: non_blank(self.tag_string_general),
                meta: non_blank(self.tag_string_meta),
            },
            file_url: resolve(self.file_url),
            preview_url: resolve(self.preview_file_url),
            large_url: resolve(self.large_file_url),
            width: self.image_width,
            height: self.image_height,
            score: self.score,
            fav_count: self.fav_count,
            up_score: self.up_score,
            down_score: self.down_score,
            is_favorited: self.is_favorited,
            source: non_blank(self.source),
            my_vote: None,
        })
    }
}

/// `/tags.json` element.
#[derive(Debug, Deserialize)]
pub struct TagResponse {
    pub name: String,
    pub category: Option<u8>,
    pub post_count: Option<i64>,
}

impl From<TagResponse> for Tag {
    fn from(value: TagResponse) -> Self {
        Self {
            name: value.name,
            kind: value.category.and_then(TagKind::from_category),
            post_count: value.post_count,
        }
    }
}

/// `/comments.json` element.
#[derive(Debug, Deserialize)]
pub struct CommentResponse {
    pub id: i64,
    pub post_id: i64,
    pub creator_id: Option<i64>,
    pub creator_name: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default, with = "iso8601_option")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<CommentResponse> for Comment {
    fn from(value: CommentResponse) -> Self {
        Self {
            id: value.id,
            post_id: PostId(value.post_id),
            creator_id: value.creator_id,
            creator_name: non_blank(value.creator_name),
            body: value.body,
            created_at: value.created_at,
        }
    }
}

/// `/profile.json` payload.
#[derive(Debug, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub level_string: Option<String>,
    pub email: Option<String>,
    #[serde(default, with = "iso8601_option")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<UserResponse> for UserProfile {
    fn from(value: UserResponse) -> Self {
        Self {
            id: value.id,
            name: value.name,
            level: non_blank(value.level_string),
            email: non_blank(value.email),
            created_at: value.created_at,
        }
    }
}

/// Error body returned with non-success statuses.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub message: Option<String>,
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_conversion_resolves_urls() {
        let json = r#"{
            "id": 5,
            "rating": "q",
            "file_url": "https://cdn.donmai.us/original/a.png",
            "preview_file_url": "/data/preview/a.jpg",
            "large_file_url": "",
            "source": ""
        }"#;
        let dto: PostResponse = serde_json::from_str(json).unwrap();
        let post = dto.into_post(&UrlResolver::default()).unwrap();

        assert_eq!(post.rating, Some(Rating::Questionable));
        assert_eq!(
            post.preview_url.as_deref(),
            Some("https://danbooru.donmai.us/data/preview/a.jpg")
        );
        assert_eq!(post.large_url, None);
        assert_eq!(post.source, None);
    }

    #[test]
    fn test_unknown_rating_fails_closed() {
        let dto: PostResponse = serde_json::from_str(r#"{"id": 1, "rating": "z"}"#).unwrap();
        let result = dto.into_post(&UrlResolver::default());
        assert!(matches!(result, Err(ApiError::Decoding { .. })));
    }

    #[test]
    fn test_type_mismatch_is_an_error() {
        let result = serde_json::from_str::<PostResponse>(r#"{"id": "abc"}"#);
        assert!(result.is_err());
        let result = serde_json::from_str::<PostResponse>(r#"{"id": 1, "score": "high"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_tag_conversion() {
        let dto: TagResponse =
            serde_json::from_str(r#"{"name": "hatsune_miku", "category": 4, "post_count": 100}"#)
                .unwrap();
        let tag = Tag::from(dto);
        assert_eq!(tag.kind, Some(TagKind::Character));
        assert_eq!(tag.post_count, Some(100));
    }
}
