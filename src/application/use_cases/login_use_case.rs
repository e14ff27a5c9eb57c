//! Login use case implementation.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::dto::{LoginRequest, LoginResponse};
use crate::application::services::Session;
use crate::domain::entities::Credentials;
use crate::domain::errors::{ApiError, AuthError};
use crate::domain::ports::{AccountRepository, CredentialStore};

/// Handles login and logout.
#[derive(Clone)]
pub struct LoginUseCase {
    accounts: Arc<dyn AccountRepository>,
    store: Arc<dyn CredentialStore>,
    session: Arc<Session>,
}

impl LoginUseCase {
    /// Creates new login use case.
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

    /// Verifies credentials against the current-user endpoint and, on
    /// success, persists them and authenticates the session.
    ///
    /// On failure the previously active credentials are restored.
    ///
    /// # Errors
    /// Returns error if credentials are incomplete or rejected.
    pub async fn execute(&self, request: LoginRequest) -> Result<LoginResponse, AuthError> {
        debug!(source = %request.source, "Attempting login");

        if !request.credentials.is_usable() {
            warn!("Login attempted with incomplete credentials");
            return Err(ApiError::MissingCredentials.into());
        }

        let previous = self.accounts.active_credentials();
        self.accounts.apply_credentials(&request.credentials);

        let user = match self.accounts.current_user().await {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "Credential verification failed");
                self.accounts.apply_credentials(&previous);
                return Err(e.into());
            }
        };

        info!(user_id = user.id, username = %user.name, "Successfully authenticated");

        let persisted = if request.persist {
            match self.store.save(&request.credentials).await {
                Ok(()) => {
                    info!("Credentials persisted to secure storage");
                    true
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to persist credentials to secure storage");
                    false
                }
            }
        } else {
            debug!("Credential persistence disabled, skipping storage");
            false
        };

        self.session.authenticate(user.clone());
        Ok(LoginResponse::new(user, request.source, persisted))
    }

    /// Forgets stored and active credentials.
    ///
    /// # Errors
    /// Returns error if the stored credentials cannot be deleted.
    pub async fn logout(&self) -> Result<(), AuthError> {
        debug!("Deleting credentials from secure storage");
        self.accounts.apply_credentials(&Credentials::empty());
        self.session.reset();
        match self.store.clear().await {
            Ok(()) => {
                info!("Credentials deleted from secure storage");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to delete credentials from secure storage");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::CredentialSource;
    use crate::application::services::SessionState;
    use crate::domain::entities::UserProfile;
    use crate::domain::ports::mocks::MockAccountRepository;
    use crate::infrastructure::storage::InMemoryCredentialStore;
    use mockall::predicate::eq;

    fn alice() -> Credentials {
        Credentials::from_parts("alice", "key123")
    }

    #[tokio::test]
    async fn test_successful_login() {
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_active_credentials()
            .returning(Credentials::empty);
        accounts
            .expect_apply_credentials()
            .with(eq(alice()))
            .times(1)
            .return_const(());
        accounts
            .expect_current_user()
            .times(1)
            .returning(|| Ok(UserProfile::new(7, "alice")));

        let store = Arc::new(InMemoryCredentialStore::new());
        let session = Arc::new(Session::new());
        let use_case = LoginUseCase::new(Arc::new(accounts), store.clone(), session.clone());

        let response = use_case
            .execute(LoginRequest::new(alice(), CredentialSource::UserInput))
            .await
            .unwrap();

        assert_eq!(response.user.name, "alice");
        assert!(response.persisted);
        assert!(store.has_credentials().await);
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn test_incomplete_credentials_never_reach_the_server() {
        let mut accounts = MockAccountRepository::new();
        accounts.expect_current_user().times(0);
        accounts.expect_apply_credentials().times(0);

        let use_case = LoginUseCase::new(
            Arc::new(accounts),
            Arc::new(InMemoryCredentialStore::new()),
            Arc::new(Session::new()),
        );
        let request = LoginRequest::new(
            Credentials::new(Some("alice"), Some("   ")),
            CredentialSource::UserInput,
        );

        let result = use_case.execute(request).await;
        assert!(matches!(
            result,
            Err(AuthError::Api(ApiError::MissingCredentials))
        ));
    }

    #[tokio::test]
    async fn test_rejected_credentials_restore_previous() {
        let previous = Credentials::from_parts("bob", "old");
        let expected_previous = previous.clone();

        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_active_credentials()
            .returning(move || previous.clone());
        accounts
            .expect_apply_credentials()
            .with(eq(alice()))
            .times(1)
            .return_const(());
        accounts
            .expect_apply_credentials()
            .with(eq(expected_previous))
            .times(1)
            .return_const(());
        accounts
            .expect_current_user()
            .returning(|| Err(ApiError::ServerError { status: 401 }));

        let store = Arc::new(InMemoryCredentialStore::new());
        let session = Arc::new(Session::new());
        let use_case = LoginUseCase::new(Arc::new(accounts), store.clone(), session.clone());

        let result = use_case
            .execute(LoginRequest::new(alice(), CredentialSource::UserInput))
            .await;

        assert!(result.unwrap_err().is_rejected());
        assert!(!store.has_credentials().await);
        assert_eq!(session.state(), SessionState::Anonymous);
    }

    #[tokio::test]
    async fn test_login_without_persistence() {
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_active_credentials()
            .returning(Credentials::empty);
        accounts.expect_apply_credentials().return_const(());
        accounts
            .expect_current_user()
            .returning(|| Ok(UserProfile::new(7, "alice")));

        let store = Arc::new(InMemoryCredentialStore::new());
        let use_case = LoginUseCase::new(
            Arc::new(accounts),
            store.clone(),
            Arc::new(Session::new()),
        );

        let response = use_case
            .execute(LoginRequest::new(alice(), CredentialSource::Environment).without_persistence())
            .await
            .unwrap();

        assert!(!response.persisted);
        assert!(!store.has_credentials().await);
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_apply_credentials()
            .with(eq(Credentials::empty()))
            .times(1)
            .return_const(());

        let store = Arc::new(InMemoryCredentialStore::with_credentials(alice()));
        let session = Arc::new(Session::new());
        session.authenticate(UserProfile::new(7, "alice"));
        let use_case = LoginUseCase::new(Arc::new(accounts), store.clone(), session.clone());

        use_case.logout().await.unwrap();

        assert!(store.load().await.is_empty());
        assert_eq!(session.state(), SessionState::Anonymous);
    }
}
