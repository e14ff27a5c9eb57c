//! Secret storage error types.

use thiserror::Error;

/// Secret storage error variants.
#[derive(Debug, Clone, Error)]
#[allow(missing_docs)]
pub enum SecretError {
    #[error("secure storage failed to {operation}: {message}")]
    UnexpectedStatus {
        operation: &'static str,
        message: String,
    },

    #[error("secure storage not available: {0}")]
    NotAvailable(String),
}

impl SecretError {
    /// Creates an opaque backend failure for the given operation.
    #[must_use]
    pub fn unexpected(operation: &'static str, message: impl Into<String>) -> Self {
        Self::UnexpectedStatus {
            operation,
            message: message.into(),
        }
    }
}
