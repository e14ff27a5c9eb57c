//! Authentication flow error types.

use thiserror::Error;

use super::{ApiError, SecretError};

/// Errors from login, logout and credential restore.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum AuthError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("secure storage error: {0}")]
    Secret(#[from] SecretError),
}

impl AuthError {
    /// Returns whether the server rejected the credentials.
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Api(e) if e.is_auth_failure())
    }

    /// Returns whether error is network related.
    #[must_use]
    pub const fn is_network_error(&self) -> bool {
        matches!(self, Self::Api(e) if e.is_network_error())
    }
}
