//! Auth session manager.
//!
//! `SessionManager` is the only writer of session state. Readers subscribe to
//! a `watch` channel and always see a complete `Session` snapshot.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError, ErrorKind};
use crate::models::User;
use crate::navigation::{Navigator, Route};

use super::state::Session;
use super::token_store::{Credential, TokenStore};

/// Shown when the server rejects a login without saying why
pub const GENERIC_LOGIN_FAILURE: &str = "Login failed. Please try again.";

/// Shown for a 401 without a server message
const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Error, Debug)]
pub enum LoginError {
    #[error("Email and password are required")]
    MissingCredentials,

    /// Server message, verbatim
    #[error("{0}")]
    Rejected(String),

    #[error("Unable to connect to server. Check your internet connection.")]
    Network(#[source] ApiError),

    #[error("Could not save your session: {0}")]
    Storage(String),

    #[error("Login was cancelled by a logout")]
    Superseded,
}

impl LoginError {
    fn from_api(err: ApiError) -> Self {
        match err.kind() {
            ErrorKind::Network => LoginError::Network(err),
            ErrorKind::Auth | ErrorKind::Server => {
                let message = match (err.server_message(), &err) {
                    (Some(message), _) => message.to_string(),
                    (None, ApiError::Unauthorized { .. }) => INVALID_CREDENTIALS.to_string(),
                    (None, _) => GENERIC_LOGIN_FAILURE.to_string(),
                };
                LoginError::Rejected(message)
            }
        }
    }

    /// Text safe to render in the login form
    pub fn user_message(&self) -> String {
        match self {
            LoginError::Storage(_) => "Could not save your session. Please try again.".to_string(),
            other => other.to_string(),
        }
    }
}

pub struct SessionManager {
    api: ApiClient,
    tokens: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    state: watch::Sender<Session>,
    /// Serializes login and session checks
    op_lock: Mutex<()>,
    /// Bumped by every logout, under the state lock
    generation: AtomicU64,
    /// Set once a session check, login or logout has published a result
    bootstrapped: AtomicBool,
}

impl SessionManager {
    pub fn new(api: ApiClient, tokens: Arc<dyn TokenStore>, navigator: Arc<dyn Navigator>) -> Self {
        let (state, _) = watch::channel(Session::bootstrapping());
        Self {
            api,
            tokens,
            navigator,
            state,
            op_lock: Mutex::new(()),
            generation: AtomicU64::new(0),
            bootstrapped: AtomicBool::new(false),
        }
    }

    /// Current session snapshot
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Receiver that observes every session change
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Publish `session` unless a logout happened since `generation` was read.
    /// `before_publish` runs under the state lock and may veto the change.
    fn commit<F>(&self, generation: u64, session: Session, before_publish: F) -> Result<(), LoginError>
    where
        F: FnOnce() -> Result<(), LoginError>,
    {
        let mut outcome = Ok(());
        self.state.send_if_modified(|current| {
            if self.generation.load(Ordering::SeqCst) != generation {
                outcome = Err(LoginError::Superseded);
                return false;
            }
            if let Err(e) = before_publish() {
                outcome = Err(e);
                return false;
            }
            *current = session;
            true
        });
        outcome
    }

    /// Publish a session check result; a logout in the meantime wins.
    fn commit_check<F>(&self, generation: u64, session: Session, before_publish: F)
    where
        F: FnOnce() -> Result<(), LoginError>,
    {
        if let Err(e) = self.commit(generation, session, before_publish) {
            debug!(error = %e, "Discarding session check result");
        }
    }

    /// Validate the stored credential once at startup.
    ///
    /// Never fails: any validation problem ends in an anonymous session with
    /// the stored credential removed. Later calls wait for the first one and
    /// return its result without further I/O. If the first call is dropped
    /// before it publishes, the next call performs the check instead.
    pub async fn check_session(&self) -> Session {
        let generation = self.generation.load(Ordering::SeqCst);
        let _op = self.op_lock.lock().await;
        if self.bootstrapped.load(Ordering::SeqCst) {
            debug!("Session already bootstrapped");
            return self.snapshot();
        }

        let stored = match self.tokens.get() {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "Failed to read stored credential, treating as absent");
                None
            }
        };

        match stored {
            None => {
                debug!("No stored credential");
                self.commit_check(generation, Session::anonymous(), || Ok(()));
            }
            Some(_) => match self.api.me().await {
                Ok(user) => {
                    info!(user_id = user.id, role = %user.role, "Session restored");
                    self.commit_check(generation, Session::authenticated(user), || Ok(()));
                }
                Err(e) => {
                    info!(error = %e, kind = ?e.kind(), "Stored credential rejected, signing out");
                    let tokens = Arc::clone(&self.tokens);
                    self.commit_check(generation, Session::anonymous(), move || {
                        if let Err(e) = tokens.clear() {
                            warn!(error = %e, "Failed to clear stored credential");
                        }
                        Ok(())
                    });
                }
            },
        }

        // Only reached once a result was published or superseded
        self.bootstrapped.store(true, Ordering::SeqCst);
        self.snapshot()
    }

    /// Authenticate with the server and start a session.
    ///
    /// The identifier is trimmed; an empty identifier or secret is rejected
    /// without a request. On failure the session is left exactly as it was.
    /// A logout issued after this call started, even while it is still
    /// queued behind another operation, cancels it.
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<User, LoginError> {
        let generation = self.generation.load(Ordering::SeqCst);
        let identifier = identifier.trim();
        if identifier.is_empty() || secret.is_empty() {
            return Err(LoginError::MissingCredentials);
        }

        let _op = self.op_lock.lock().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("Logout while login was queued, skipping request");
            return Err(LoginError::Superseded);
        }

        let response = match self.api.login(identifier, secret).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Login failed");
                return Err(LoginError::from_api(e));
            }
        };

        let credential = Credential::new(response.token);
        let user = response.user;
        let tokens = Arc::clone(&self.tokens);

        self.commit(generation, Session::authenticated(user.clone()), move || {
            tokens
                .set(&credential)
                .map_err(|e| LoginError::Storage(e.to_string()))
        })
        .inspect_err(|e| warn!(error = %e, "Discarding login result"))?;

        // A login before the startup check counts as the bootstrap
        self.bootstrapped.store(true, Ordering::SeqCst);
        info!(user_id = user.id, role = %user.role, "Login successful");
        Ok(user)
    }

    /// End the session and hard-navigate to the login view.
    ///
    /// Runs unconditionally, even without an active session. Any login or
    /// session check still in flight will discard its result.
    pub fn logout(&self) {
        self.state.send_modify(|current| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            if let Err(e) = self.tokens.clear() {
                warn!(error = %e, "Failed to clear stored credential");
            }
            *current = Session::anonymous();
        });
        self.bootstrapped.store(true, Ordering::SeqCst);
        info!("Logged out");
        self.navigator.hard_redirect(Route::Login.path());
    }
}
