//! Authentication DTOs.

use crate::domain::entities::{Credentials, UserProfile};

/// Where credentials came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// `BOORU_USERNAME` / `BOORU_API_KEY` environment variables.
    Environment,
    /// System keyring.
    Keyring,
    /// Entered by the user.
    UserInput,
}

impl CredentialSource {
    /// Returns human-readable description.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Environment => "environment variable",
            Self::Keyring => "system keyring",
            Self::UserInput => "user input",
        }
    }
}

impl std::fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Login request data.
#[derive(Debug, Clone)]
pub struct LoginRequest {
    /// Credentials to verify.
    pub credentials: Credentials,
    /// Where they came from.
    pub source: CredentialSource,
    /// Whether to persist them once verified.
    pub persist: bool,
}

impl LoginRequest {
    /// Creates new login request.
    #[must_use]
    pub const fn new(credentials: Credentials, source: CredentialSource) -> Self {
        Self {
            credentials,
            source,
            persist: true,
        }
    }

    /// Disables credential persistence.
    #[must_use]
    pub fn without_persistence(mut self) -> Self {
        self.persist = false;
        self
    }
}

/// Login response data.
#[derive(Debug, Clone)]
pub struct LoginResponse {
    /// Authenticated user.
    pub user: UserProfile,
    /// Credential source used.
    pub source: CredentialSource,
    /// Whether the credentials were persisted.
    pub persisted: bool,
}

impl LoginResponse {
    /// Creates new login response.
    #[must_use]
    pub const fn new(user: UserProfile, source: CredentialSource, persisted: bool) -> Self {
        Self {
            user,
            source,
            persisted,
        }
    }
}
