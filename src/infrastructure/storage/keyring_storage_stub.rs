//! Stub keyring storage for builds without keyring support.

use async_trait::async_trait;
use tracing::debug;

use crate::domain::entities::Credentials;
use crate::domain::errors::SecretError;
use crate::domain::ports::CredentialStore;

/// Credential store that never holds anything.
/// Used when keyring feature is disabled.
#[derive(Debug, Default)]
pub struct KeyringCredentialStore;

impl KeyringCredentialStore {
    /// Creates new stub storage.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Creates storage with a custom service name (no-op in stub).
    #[must_use]
    pub fn with_service(_service: impl Into<String>) -> Self {
        Self
    }
}

#[async_trait]
impl CredentialStore for KeyringCredentialStore {
    async fn load(&self) -> Credentials {
        debug!("Keyring feature disabled - no credentials available");
        Credentials::empty()
    }

    async fn save(&self, credentials: &Credentials) -> Result<(), SecretError> {
        if credentials.is_empty() {
            return Ok(());
        }
        Err(SecretError::NotAvailable(
            "built without keyring support".to_string(),
        ))
    }

    async fn clear(&self) -> Result<(), SecretError> {
        Ok(())
    }
}
