//! Keyring-based credential storage.

use async_trait::async_trait;
use keyring::Entry;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::domain::entities::Credentials;
use crate::domain::errors::SecretError;
use crate::domain::ports::CredentialStore;

const KEYRING_SERVICE: &str = "booru-view";
const USERNAME_ENTRY: &str = "username";
const API_KEY_ENTRY: &str = "api_key";

/// System keyring credential storage adapter.
///
/// The username and API key live in two entries under one service name.
pub struct KeyringCredentialStore {
    service: String,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for KeyringCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyringCredentialStore")
            .field("service", &self.service)
            .finish_non_exhaustive()
    }
}

impl KeyringCredentialStore {
    /// Creates storage with the default service name.
    #[must_use]
    pub fn new() -> Self {
        Self::with_service(KEYRING_SERVICE)
    }

    /// Creates storage with a custom service name.
    #[must_use]
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn read(&self, account: &'static str) -> Result<Option<String>, SecretError> {
        let service = self.service.clone();
        tokio::task::spawn_blocking(move || {
            let entry = Entry::new(&service, account)
                .map_err(|e| SecretError::unexpected("open", e.to_string()))?;
            match entry.get_password() {
                Ok(value) => Ok(Some(value)),
                Err(keyring::Error::NoEntry) => Ok(None),
                Err(e) => Err(SecretError::unexpected("read", e.to_string())),
            }
        })
        .await
        .map_err(|e| SecretError::unexpected("read", e.to_string()))?
    }

    async fn write(&self, account: &'static str, value: Option<String>) -> Result<(), SecretError> {
        let service = self.service.clone();
        tokio::task::spawn_blocking(move || {
            let entry = Entry::new(&service, account)
                .map_err(|e| SecretError::unexpected("open", e.to_string()))?;
            match value {
                Some(value) => entry
                    .set_password(&value)
                    .map_err(|e| SecretError::unexpected("write", e.to_string())),
                None => match entry.delete_credential() {
                    Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
                    Err(e) => Err(SecretError::unexpected("delete", e.to_string())),
                },
            }
        })
        .await
        .map_err(|e| SecretError::unexpected("write", e.to_string()))?
    }
}

impl Default for KeyringCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for KeyringCredentialStore {
    async fn load(&self) -> Credentials {
        debug!(service = %self.service, "Loading credentials from keyring");

        let username = self.read(USERNAME_ENTRY).await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read username from keyring");
            None
        });
        let api_key = self.read(API_KEY_ENTRY).await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read API key from keyring");
            None
        });

        let credentials = Credentials::new(username.as_deref(), api_key.as_deref());
        debug!(usable = credentials.is_usable(), "Loaded credentials");
        credentials
    }

    async fn save(&self, credentials: &Credentials) -> Result<(), SecretError> {
        if credentials.is_empty() {
            return self.clear().await;
        }

        let _guard = self.write_lock.lock().await;
        debug!(service = %self.service, "Storing credentials in keyring");

        self.write(USERNAME_ENTRY, credentials.username().map(String::from))
            .await
            .inspect_err(|e| warn!(error = %e, "Failed to store username"))?;
        self.write(API_KEY_ENTRY, credentials.api_key().map(String::from))
            .await
            .inspect_err(|e| warn!(error = %e, "Failed to store API key"))?;

        debug!("Credentials stored successfully");
        Ok(())
    }

    async fn clear(&self) -> Result<(), SecretError> {
        let _guard = self.write_lock.lock().await;
        debug!(service = %self.service, "Deleting credentials from keyring");

        self.write(USERNAME_ENTRY, None).await?;
        self.write(API_KEY_ENTRY, None).await?;
        Ok(())
    }
}
