//! Account repository port definition.

use async_trait::async_trait;

use crate::domain::entities::{Credentials, UserProfile};
use crate::domain::errors::ApiError;

/// Typed access to the authenticated account.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Profile of the user the active credentials belong to.
    async fn current_user(&self) -> Result<UserProfile, ApiError>;

    /// Replaces the credentials used for subsequent requests.
    fn apply_credentials(&self, credentials: &Credentials);

    /// Returns the credentials currently in use.
    fn active_credentials(&self) -> Credentials;
}
