//! API credential value object.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Username and API key pair.
///
/// Values are sanitized on construction: surrounding whitespace is trimmed
/// and empty strings become absent, so a `Credentials` value is always
/// consistent with [`Credentials::is_usable`].
#[derive(Clone, Default, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    username: Option<String>,
    api_key: Option<String>,
}

fn sanitize(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl Credentials {
    /// Creates sanitized credentials.
    #[must_use]
    pub fn new(username: Option<&str>, api_key: Option<&str>) -> Self {
        Self {
            username: sanitize(username),
            api_key: sanitize(api_key),
        }
    }

    /// Creates credentials from both parts.
    #[must_use]
    pub fn from_parts(username: &str, api_key: &str) -> Self {
        Self::new(Some(username), Some(api_key))
    }

    /// Creates an empty pair.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Returns the API key.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Returns true when both username and API key are present.
    #[must_use]
    pub const fn is_usable(&self) -> bool {
        self.username.is_some() && self.api_key.is_some()
    }

    /// Returns true when neither part is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.username.is_none() && self.api_key.is_none()
    }

    /// Returns the masked API key for display.
    #[must_use]
    pub fn masked_key(&self) -> String {
        let Some(key) = self.api_key.as_deref() else {
            return String::new();
        };
        if key.len() <= 8 || !key.is_ascii() {
            return "*".repeat(key.chars().count());
        }
        format!("{}...{}", &key[..2], &key[key.len() - 2..])
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("api_key", &self.masked_key())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitization() {
        let creds = Credentials::new(Some("  alice "), Some("\tkey123\n"));
        assert_eq!(creds.username(), Some("alice"));
        assert_eq!(creds.api_key(), Some("key123"));
        assert!(creds.is_usable());
    }

    #[test]
    fn test_blank_parts_become_absent() {
        let creds = Credentials::new(Some("   "), Some(""));
        assert!(creds.is_empty());
        assert!(!creds.is_usable());
        assert_eq!(creds, Credentials::empty());
    }

    #[test]
    fn test_half_pair_is_not_usable() {
        assert!(!Credentials::new(Some("alice"), None).is_usable());
        assert!(!Credentials::new(None, Some("key")).is_usable());
    }

    #[test]
    fn test_debug_does_not_leak_key() {
        let creds = Credentials::from_parts("alice", "s3cr3t-api-key-value");
        let debug_output = format!("{creds:?}");
        assert!(!debug_output.contains("s3cr3t-api-key-value"));
        assert!(debug_output.contains("alice"));
    }
}
