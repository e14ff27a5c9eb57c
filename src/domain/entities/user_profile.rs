//! Authenticated user profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The profile of the user the credentials belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Account level label (e.g. "Member", "Gold").
    pub level: Option<String>,
    /// Email, only visible to the owner.
    pub email: Option<String>,
    /// Account creation time.
    pub created_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Creates a profile with only id and name.
    #[must_use]
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            level: None,
            email: None,
            created_at: None,
        }
    }
}
