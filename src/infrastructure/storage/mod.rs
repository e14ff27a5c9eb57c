//! Credential storage adapters.

#[cfg(feature = "keyring")]
mod keyring_storage;
#[cfg(not(feature = "keyring"))]
mod keyring_storage_stub;
mod memory_storage;

#[cfg(feature = "keyring")]
pub use keyring_storage::KeyringCredentialStore;
#[cfg(not(feature = "keyring"))]
pub use keyring_storage_stub::KeyringCredentialStore;
pub use memory_storage::InMemoryCredentialStore;
