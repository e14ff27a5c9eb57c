//! Credential storage port definition.

use async_trait::async_trait;

use crate::domain::entities::Credentials;
use crate::domain::errors::SecretError;

/// Port for credential persistence.
///
/// Implementations sanitize on every read and write and serialize writes.
/// Saving an empty pair is equivalent to [`CredentialStore::clear`].
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Retrieves stored credentials. Never fails: missing or unreadable
    /// data yields an empty pair.
    async fn load(&self) -> Credentials;

    /// Stores credentials, replacing whatever was stored.
    async fn save(&self, credentials: &Credentials) -> Result<(), SecretError>;

    /// Deletes stored credentials. Succeeds when nothing is stored.
    async fn clear(&self) -> Result<(), SecretError>;

    /// Checks if usable credentials are stored.
    async fn has_credentials(&self) -> bool {
        self.load().await.is_usable()
    }
}
