//! Domain layer with core business entities and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;
/// Search history.
pub mod search;
/// Serde utilities.
pub mod serde_utils;

pub use entities::{Credentials, Post, Tag, UserProfile};
pub use errors::{ApiError, AuthError, ImageError, SecretError};
pub use ports::{AccountRepository, CredentialStore, PostRepository, TagRepository};
