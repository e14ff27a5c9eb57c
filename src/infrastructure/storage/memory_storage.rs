//! In-process credential storage.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::entities::Credentials;
use crate::domain::errors::SecretError;
use crate::domain::ports::CredentialStore;

/// Credential store that keeps the pair in memory for the process lifetime.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    stored: Mutex<Credentials>,
}

impl InMemoryCredentialStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `credentials`.
    #[must_use]
    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            stored: Mutex::new(credentials),
        }
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn load(&self) -> Credentials {
        self.stored.lock().await.clone()
    }

    async fn save(&self, credentials: &Credentials) -> Result<(), SecretError> {
        let sanitized = Credentials::new(credentials.username(), credentials.api_key());
        *self.stored.lock().await = sanitized;
        debug!("Stored credentials in memory");
        Ok(())
    }

    async fn clear(&self) -> Result<(), SecretError> {
        *self.stored.lock().await = Credentials::empty();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip() {
        let store = InMemoryCredentialStore::new();
        store
            .save(&Credentials::from_parts("alice", "key"))
            .await
            .unwrap();

        let loaded = store.load().await;
        assert_eq!(loaded.username(), Some("alice"));
        assert_eq!(loaded.api_key(), Some("key"));
        assert!(store.has_credentials().await);
    }

    #[tokio::test]
    async fn test_blank_save_equals_clear() {
        let store = InMemoryCredentialStore::with_credentials(Credentials::from_parts("a", "b"));

        store
            .save(&Credentials::new(Some("  "), Some("\t")))
            .await
            .unwrap();

        assert!(store.load().await.is_empty());
        assert!(!store.has_credentials().await);
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let store = InMemoryCredentialStore::new();
        store.clear().await.unwrap();
        store.clear().await.unwrap();
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_partial_pair_is_not_usable() {
        let store = InMemoryCredentialStore::new();
        store
            .save(&Credentials::new(Some("alice"), None))
            .await
            .unwrap();

        assert_eq!(store.load().await.username(), Some("alice"));
        assert!(!store.has_credentials().await);
    }
}
