//! Content API error types.

use thiserror::Error;

/// Flavour of a network-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Host unreachable or connection refused.
    Offline,
    /// Request or total-resource timeout elapsed.
    Timeout,
    /// Any other network failure.
    Other,
}

impl std::fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Offline => write!(f, "offline"),
            Self::Timeout => write!(f, "timeout"),
            Self::Other => write!(f, "network"),
        }
    }
}

/// Errors surfaced by the API client and repositories.
#[derive(Debug, Clone, Error)]
#[allow(missing_docs)]
pub enum ApiError {
    #[error("invalid response from server")]
    InvalidResponse,

    #[error("server returned HTTP {status}")]
    ServerError { status: u16 },

    #[error("failed to decode response: {message}")]
    Decoding { message: String },

    #[error("this action requires a username and API key")]
    MissingCredentials,

    #[error("{kind} error: {message}")]
    Transport {
        kind: TransportErrorKind,
        message: String,
    },
}

/// Coarse classification used to pick user-facing guidance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Offline, timeouts, connection failures.
    Connectivity,
    /// Missing or rejected credentials.
    Credentials,
    /// Server-side failures.
    Server,
    /// Client/server schema mismatch.
    Client,
}

impl ErrorCategory {
    /// Returns the hint shown next to the error.
    #[must_use]
    pub const fn guidance(self) -> &'static str {
        match self {
            Self::Connectivity => "Check your internet connection and try again.",
            Self::Credentials => "Check your username and API key in settings.",
            Self::Server => "The server had a problem. Try again later.",
            Self::Client => "Unexpected data from the server. Please report this issue.",
        }
    }
}

impl ApiError {
    /// Creates a decoding error.
    #[must_use]
    pub fn decoding(message: impl Into<String>) -> Self {
        Self::Decoding {
            message: message.into(),
        }
    }

    /// Creates a transport error.
    #[must_use]
    pub fn transport(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self::Transport {
            kind,
            message: message.into(),
        }
    }

    /// Returns true for 401/403 responses.
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self, Self::ServerError { status: 401 | 403 })
    }

    /// Returns whether error is network related.
    #[must_use]
    pub const fn is_network_error(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Classifies the error for user-facing guidance.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Transport { .. } => ErrorCategory::Connectivity,
            Self::MissingCredentials => ErrorCategory::Credentials,
            Self::ServerError { status: 401 | 403 } => ErrorCategory::Credentials,
            Self::ServerError { .. } | Self::InvalidResponse => ErrorCategory::Server,
            Self::Decoding { .. } => ErrorCategory::Client,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_failures() {
        assert!(ApiError::ServerError { status: 401 }.is_auth_failure());
        assert!(ApiError::ServerError { status: 403 }.is_auth_failure());
        assert!(!ApiError::ServerError { status: 500 }.is_auth_failure());
        assert!(!ApiError::MissingCredentials.is_auth_failure());
    }

    #[test]
    fn test_guidance_is_distinct_per_category() {
        let offline = ApiError::transport(TransportErrorKind::Offline, "no route");
        let creds = ApiError::MissingCredentials;
        let server = ApiError::ServerError { status: 503 };

        assert_eq!(offline.category(), ErrorCategory::Connectivity);
        assert_eq!(creds.category(), ErrorCategory::Credentials);
        assert_eq!(server.category(), ErrorCategory::Server);
        assert_ne!(
            offline.category().guidance(),
            creds.category().guidance()
        );
        assert_ne!(creds.category().guidance(), server.category().guidance());
    }

    #[test]
    fn test_decode_errors_are_generic() {
        let err = ApiError::decoding("missing field `id`");
        assert_eq!(err.category(), ErrorCategory::Client);
        assert!(!err.is_network_error());
    }
}
