//! Process-wide authentication state.

use tokio::sync::watch;
use tracing::{info, warn};

use crate::domain::entities::UserProfile;

/// Authentication state observed by the rest of the application.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No credentials are trusted.
    #[default]
    Anonymous,
    /// Credentials were verified for this user.
    Authenticated(UserProfile),
    /// The server rejected credentials that used to work.
    NeedsReauthentication,
}

impl SessionState {
    /// Returns the authenticated user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&UserProfile> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// Shared session, observable through a watch channel.
#[derive(Debug)]
pub struct Session {
    state: watch::Sender<SessionState>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Creates an anonymous session.
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionState::Anonymous);
        Self { state }
    }

    /// Subscribes to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Returns a snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Returns true if credentials were verified.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(*self.state.borrow(), SessionState::Authenticated(_))
    }

    /// Marks the session as authenticated.
    pub fn authenticate(&self, user: UserProfile) {
        info!(user_id = user.id, username = %user.name, "Session authenticated");
        self.state.send_replace(SessionState::Authenticated(user));
    }

    /// Records that the server rejected the current credentials.
    pub fn invalidate(&self) {
        warn!("Credentials rejected, session needs re-authentication");
        self.state.send_replace(SessionState::NeedsReauthentication);
    }

    /// Returns to the anonymous state.
    pub fn reset(&self) {
        self.state.send_replace(SessionState::Anonymous);
    }
}
