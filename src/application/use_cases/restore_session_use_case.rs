//! Credential restore use case.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::dto::CredentialSource;
use crate::application::services::Session;
use crate::domain::entities::{Credentials, UserProfile};
use crate::domain::errors::AuthError;
use crate::domain::ports::{AccountRepository, CredentialStore};

/// Credentials made active at start-up.
#[derive(Debug, Clone)]
pub struct RestoredSession {
    /// Where the credentials came from.
    pub source: CredentialSource,
    /// Verified profile, when verification was requested.
    pub user: Option<UserProfile>,
}

/// Activates stored or environment-provided credentials.
pub struct RestoreSessionUseCase {
    accounts: Arc<dyn AccountRepository>,
    store: Arc<dyn CredentialStore>,
    session: Arc<Session>,
}

impl RestoreSessionUseCase {
    /// Creates new use case.
    #[must_use]
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        store: Arc<dyn CredentialStore>,
        session: Arc<Session>,
    ) -> Self {
        Self {
            accounts,
            store,
            session,
        }
    }

    /// Resolves credentials and applies them to the API client.
    ///
    /// Priority:
    /// 1. Keyring
    /// 2. Environment (passed as argument)
    ///
    /// With `verify`, the current-user endpoint is queried: success
    /// authenticates the session and a 401/403 marks it as needing
    /// re-authentication.
    ///
    /// # Errors
    /// Returns error only when verification fails.
    pub async fn execute(
        &self,
        env_credentials: Option<Credentials>,
        verify: bool,
    ) -> Result<Option<RestoredSession>, AuthError> {
        debug!("Checking keyring for stored credentials");
        let stored = self.store.load().await;

        let (credentials, source) = if stored.is_usable() {
            info!("Using credentials from system keyring");
            (stored, CredentialSource::Keyring)
        } else if let Some(env) = env_credentials.filter(Credentials::is_usable) {
            info!("Using credentials from environment");
            (env, CredentialSource::Environment)
        } else {
            debug!("No credentials found in any source");
            return Ok(None);
        };

        self.accounts.apply_credentials(&credentials);

        if !verify {
            return Ok(Some(RestoredSession { source, user: None }));
        }

        match self.accounts.current_user().await {
            Ok(user) => {
                self.session.authenticate(user.clone());
                Ok(Some(RestoredSession {
                    source,
                    user: Some(user),
                }))
            }
            Err(e) => {
                if e.is_auth_failure() {
                    self.session.invalidate();
                } else {
                    warn!(error = %e, "Could not verify restored credentials");
                }
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::SessionState;
    use crate::domain::errors::ApiError;
    use crate::domain::ports::mocks::MockAccountRepository;
    use crate::infrastructure::storage::InMemoryCredentialStore;
    use mockall::predicate::eq;

    #[tokio::test]
    async fn test_keyring_takes_priority() {
        let stored = Credentials::from_parts("keyring_user", "k1");
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_apply_credentials()
            .with(eq(stored.clone()))
            .times(1)
            .return_const(());

        let use_case = RestoreSessionUseCase::new(
            Arc::new(accounts),
            Arc::new(InMemoryCredentialStore::with_credentials(stored)),
            Arc::new(Session::new()),
        );

        let restored = use_case
            .execute(Some(Credentials::from_parts("env_user", "k2")), false)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(restored.source, CredentialSource::Keyring);
        assert!(restored.user.is_none());
    }

    #[tokio::test]
    async fn test_falls_back_to_environment() {
        let env = Credentials::from_parts("env_user", "k2");
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_apply_credentials()
            .with(eq(env.clone()))
            .return_const(());
        accounts
            .expect_current_user()
            .returning(|| Ok(UserProfile::new(3, "env_user")));

        let session = Arc::new(Session::new());
        let use_case = RestoreSessionUseCase::new(
            Arc::new(accounts),
            Arc::new(InMemoryCredentialStore::new()),
            session.clone(),
        );

        let restored = use_case.execute(Some(env), true).await.unwrap().unwrap();
        assert_eq!(restored.source, CredentialSource::Environment);
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn test_nothing_to_restore() {
        let mut accounts = MockAccountRepository::new();
        accounts.expect_apply_credentials().times(0);

        let use_case = RestoreSessionUseCase::new(
            Arc::new(accounts),
            Arc::new(InMemoryCredentialStore::new()),
            Arc::new(Session::new()),
        );

        let partial = Credentials::new(Some("user"), None);
        assert!(use_case.execute(Some(partial), true).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejected_credentials_invalidate_session() {
        let mut accounts = MockAccountRepository::new();
        accounts.expect_apply_credentials().return_const(());
        accounts
            .expect_current_user()
            .returning(|| Err(ApiError::ServerError { status: 403 }));

        let session = Arc::new(Session::new());
        let use_case = RestoreSessionUseCase::new(
            Arc::new(accounts),
            Arc::new(InMemoryCredentialStore::with_credentials(
                Credentials::from_parts("a", "b"),
            )),
            session.clone(),
        );

        let result = use_case.execute(None, true).await;
        assert!(result.unwrap_err().is_rejected());
        assert_eq!(session.state(), SessionState::NeedsReauthentication);
    }
}
