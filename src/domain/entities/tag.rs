//! Tag entity.

use serde::{Deserialize, Serialize};

/// Tag category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum TagKind {
    General,
    Artist,
    Copyright,
    Character,
    Meta,
}

impl TagKind {
    /// Maps the API category code; unknown codes have no kind.
    #[must_use]
    pub const fn from_category(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::General),
            1 => Some(Self::Artist),
            3 => Some(Self::Copyright),
            4 => Some(Self::Character),
            5 => Some(Self::Meta),
            _ => None,
        }
    }
}

impl std::fmt::Display for TagKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::General => write!(f, "general"),
            Self::Artist => write!(f, "artist"),
            Self::Copyright => write!(f, "copyright"),
            Self::Character => write!(f, "character"),
            Self::Meta => write!(f, "meta"),
        }
    }
}

/// A tag. The name is its identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag name.
    pub name: String,
    /// Category, if the code was recognized.
    pub kind: Option<TagKind>,
    /// Number of posts carrying the tag.
    pub post_count: Option<i64>,
}

impl Tag {
    /// Creates a tag with no category or count.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: None,
            post_count: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_mapping() {
        assert_eq!(TagKind::from_category(0), Some(TagKind::General));
        assert_eq!(TagKind::from_category(1), Some(TagKind::Artist));
        assert_eq!(TagKind::from_category(2), None);
        assert_eq!(TagKind::from_category(5), Some(TagKind::Meta));
    }
}
