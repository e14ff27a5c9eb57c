//! Image-board post entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PostId(pub i64);

impl PostId {
    /// Returns the underlying value.
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for PostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for PostId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Content rating of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum Rating {
    General,
    Sensitive,
    Questionable,
    Explicit,
}

impl Rating {
    /// Parses the single-letter API code or the full rating name.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "g" | "general" => Some(Self::General),
            "s" | "sensitive" | "safe" => Some(Self::Sensitive),
            "q" | "questionable" => Some(Self::Questionable),
            "e" | "explicit" => Some(Self::Explicit),
            _ => None,
        }
    }

    /// Returns the single-letter API code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::General => "g",
            Self::Sensitive => "s",
            Self::Questionable => "q",
            Self::Explicit => "e",
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::General => write!(f, "general"),
            Self::Sensitive => write!(f, "sensitive"),
            Self::Questionable => write!(f, "questionable"),
            Self::Explicit => write!(f, "explicit"),
        }
    }
}

/// Space-separated tag strings split by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct CategorizedTags {
    pub artist: Option<String>,
    pub copyright: Option<String>,
    pub character: Option<String>,
    pub general: Option<String>,
    pub meta: Option<String>,
}

/// A post as returned by the content API.
///
/// Posts are immutable value records. Optimistic UI updates go through
/// [`Post::with_favorited`] and [`Post::with_vote`], which return copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Post identifier.
    pub id: PostId,
    /// Upload time.
    pub created_at: Option<DateTime<Utc>>,
    /// Content rating.
    pub rating: Option<Rating>,
    /// All tags, space separated.
    pub tag_string: Option<String>,
    /// Tags split by category.
    pub categorized_tags: CategorizedTags,
    /// Absolute URL of the original file.
    pub file_url: Option<String>,
    /// Absolute URL of the thumbnail.
    pub preview_url: Option<String>,
    /// Absolute URL of the sample-sized rendition.
    pub large_url: Option<String>,
    /// Original width in pixels.
    pub width: Option<u32>,
    /// Original height in pixels.
    pub height: Option<u32>,
    /// Net score.
    pub score: Option<i64>,
    /// Number of users who favorited the post.
    pub fav_count: Option<i64>,
    /// Up votes.
    pub up_score: Option<i64>,
    /// Down votes (the API reports these as non-positive or positive counts).
    pub down_score: Option<i64>,
    /// Whether the current user favorited the post.
    pub is_favorited: Option<bool>,
    /// Source attribution URL.
    pub source: Option<String>,
    /// Vote cast by the current user through [`Post::with_vote`].
    #[serde(default)]
    pub my_vote: Option<i32>,
}

impl Post {
    /// Creates a post with only an identifier set.
    #[must_use]
    pub fn new(id: impl Into<PostId>) -> Self {
        Self {
            id: id.into(),
            created_at: None,
            rating: None,
            tag_string: None,
            categorized_tags: CategorizedTags::default(),
            file_url: None,
            preview_url: None,
            large_url: None,
            width: None,
            height: None,
            score: None,
            fav_count: None,
            up_score: None,
            down_score: None,
            is_favorited: None,
            source: None,
            my_vote: None,
        }
    }

    /// Returns the individual tags.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tag_string
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
    }

    /// Returns image URLs ordered from lowest to highest fidelity.
    ///
    /// Duplicates are dropped, keeping the first occurrence.
    #[must_use]
    pub fn image_candidates(&self) -> Vec<String> {
        let mut candidates: Vec<String> = Vec::with_capacity(3);
        for url in [&self.preview_url, &self.large_url, &self.file_url]
            .into_iter()
            .flatten()
        {
            if !candidates.contains(url) {
                candidates.push(url.clone());
            }
        }
        candidates
    }

    /// Returns a copy with the favorite state overlaid.
    #[must_use]
    pub fn with_favorited(&self, favorited: bool) -> Self {
        let was = self.is_favorited.unwrap_or(false);
        let mut post = self.clone();
        post.is_favorited = Some(favorited);
        if was != favorited {
            let delta = if favorited { 1 } else { -1 };
            post.fav_count = Some((self.fav_count.unwrap_or(0) + delta).max(0));
        }
        post
    }

    /// Returns a copy with a vote of `score` overlaid on the tallies.
    ///
    /// A vote replaces any earlier one recorded on this copy, so voting the
    /// same way twice counts once and switching sides moves the tallies.
    #[must_use]
    pub fn with_vote(&self, score: i32) -> Self {
        let mut post = self.clone();
        let (prior_up, prior_down) = split_vote(self.my_vote.unwrap_or(0));
        let (up, down) = split_vote(score);
        post.score = Some(self.score.unwrap_or(0) - prior_up - prior_down + up + down);
        if up != prior_up {
            post.up_score = Some(self.up_score.unwrap_or(0) - prior_up + up);
        }
        if down != prior_down {
            post.down_score = Some(self.down_score.unwrap_or(0) - prior_down + down);
        }
        post.my_vote = Some(score);
        post
    }

    /// Returns the aspect ratio if both dimensions are known.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn aspect_ratio(&self) -> Option<f64> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if h > 0 => Some(f64::from(w) / f64::from(h)),
            _ => None,
        }
    }
}

/// Splits a vote into its up and down contributions.
fn split_vote(score: i32) -> (i64, i64) {
    let score = i64::from(score);
    (score.max(0), score.min(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_codes() {
        assert_eq!(Rating::from_code("s"), Some(Rating::Sensitive));
        assert_eq!(Rating::from_code("Explicit"), Some(Rating::Explicit));
        assert_eq!(Rating::from_code("x"), None);
        assert_eq!(Rating::Questionable.code(), "q");
    }

    #[test]
    fn test_image_candidates_order_and_dedup() {
        let mut post = Post::new(1);
        post.preview_url = Some("https://host/p.jpg".to_string());
        post.large_url = Some("https://host/o.jpg".to_string());
        post.file_url = Some("https://host/o.jpg".to_string());

        assert_eq!(
            post.image_candidates(),
            vec!["https://host/p.jpg".to_string(), "https://host/o.jpg".to_string()]
        );
    }

    #[test]
    fn test_optimistic_favorite_does_not_mutate_original() {
        let mut post = Post::new(7);
        post.fav_count = Some(3);
        post.is_favorited = Some(false);

        let favorited = post.with_favorited(true);

        assert_eq!(favorited.fav_count, Some(4));
        assert_eq!(favorited.is_favorited, Some(true));
        assert_eq!(post.fav_count, Some(3));
        assert_eq!(favorited.with_favorited(true).fav_count, Some(4));
    }

    #[test]
    fn test_with_vote() {
        let mut post = Post::new(7);
        post.score = Some(10);
        post.up_score = Some(12);
        post.down_score = Some(-2);

        let up = post.with_vote(1);
        assert_eq!(up.score, Some(11));
        assert_eq!(up.up_score, Some(13));

        let down = post.with_vote(-1);
        assert_eq!(down.score, Some(9));
        assert_eq!(down.down_score, Some(-3));
    }

    #[test]
    fn test_repeated_vote_counts_once() {
        let mut post = Post::new(7);
        post.score = Some(10);
        post.up_score = Some(12);
        post.down_score = Some(-2);

        let twice = post.with_vote(1).with_vote(1);
        assert_eq!(twice.score, Some(11));
        assert_eq!(twice.up_score, Some(13));
        assert_eq!(twice.down_score, Some(-2));
        assert_eq!(twice.my_vote, Some(1));
    }

    #[test]
    fn test_switching_vote_moves_tallies() {
        let mut post = Post::new(7);
        post.score = Some(10);
        post.up_score = Some(12);
        post.down_score = Some(-2);

        let switched = post.with_vote(1).with_vote(-1);
        assert_eq!(switched.score, Some(9));
        assert_eq!(switched.up_score, Some(12));
        assert_eq!(switched.down_score, Some(-3));
        assert_eq!(switched.my_vote, Some(-1));
    }

    #[test]
    fn test_tags_split() {
        let mut post = Post::new(1);
        post.tag_string = Some("1girl  solo hat".to_string());
        assert_eq!(post.tags().collect::<Vec<_>>(), vec!["1girl", "solo", "hat"]);
    }
}
