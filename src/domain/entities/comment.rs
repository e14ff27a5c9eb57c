//! Comment entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PostId;

/// A comment on a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment identifier.
    pub id: i64,
    /// Post the comment belongs to.
    pub post_id: PostId,
    /// Author id.
    pub creator_id: Option<i64>,
    /// Author name.
    pub creator_name: Option<String>,
    /// Comment text (DText markup).
    pub body: String,
    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,
}
