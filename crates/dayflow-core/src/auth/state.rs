use crate::models::User;

/// Where the session is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Stored credential not yet validated; no access decision may be made
    Bootstrapping,
    Anonymous,
    Authenticated(User),
}

/// Snapshot of the authenticated principal.
///
/// `is_authenticated` and `is_admin` are derived from the user on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    state: SessionState,
}

impl Session {
    pub fn bootstrapping() -> Self {
        Self {
            state: SessionState::Bootstrapping,
        }
    }

    pub fn anonymous() -> Self {
        Self {
            state: SessionState::Anonymous,
        }
    }

    pub fn authenticated(user: User) -> Self {
        Self {
            state: SessionState::Authenticated(user),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn user(&self) -> Option<&User> {
        match &self.state {
            SessionState::Authenticated(user) => Some(user),
            SessionState::Bootstrapping | SessionState::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user().is_some_and(User::is_admin)
    }

    pub fn loading(&self) -> bool {
        matches!(self.state, SessionState::Bootstrapping)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::bootstrapping()
    }
}
