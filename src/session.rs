//! Password gate and session lifetime.
//!
//! A session is created at start-up, resumes when the device remembers a
//! passed gate, and is torn down on logout. Notification polling only runs
//! while the session is authenticated.

use crate::config::Secret;
use crate::local_state::{LocalKey, LocalStateError, LocalStateStore, load_json, save_json};
use crate::notification::ports::NotificationRepository;
use crate::notification::services::{NotificationPoller, NotificationTracker, PageVisibility};
use mockable::Clock;
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};
use uuid::Uuid;

/// Errors raised by session operations.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// The password did not match.
    #[error("wrong password")]
    WrongPassword,

    /// The session flag could not be stored.
    #[error(transparent)]
    Local(#[from] LocalStateError),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Shared-password gate. Only the digest of the password is kept.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthGate {
    digest: Vec<u8>,
}

impl AuthGate {
    /// Creates a gate for `password`.
    #[must_use]
    pub fn new(password: &Secret) -> Self {
        Self {
            digest: Sha256::digest(password.expose().as_bytes()).to_vec(),
        }
    }

    /// Returns whether `attempt` is the configured password.
    #[must_use]
    pub fn accepts(&self, attempt: &str) -> bool {
        Sha256::digest(attempt.as_bytes()).as_slice() == self.digest.as_slice()
    }
}

impl fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthGate").finish_non_exhaustive()
    }
}

/// Application session.
pub struct AppSession {
    id: Uuid,
    gate: AuthGate,
    local: Arc<dyn LocalStateStore>,
    poller: Arc<NotificationPoller>,
    authenticated: bool,
}

impl AppSession {
    /// Starts a session, resuming a remembered login.
    ///
    /// An unreadable flag counts as logged out.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Local`] when local storage cannot be read.
    pub fn resume(
        gate: AuthGate,
        local: Arc<dyn LocalStateStore>,
        poller: Arc<NotificationPoller>,
    ) -> SessionResult<Self> {
        let authenticated = match load_json::<bool>(local.as_ref(), LocalKey::Authenticated) {
            Ok(flag) => flag.unwrap_or(false),
            Err(LocalStateError::Malformed { key, source }) => {
                warn!(key, error = %source, "discarding malformed session flag");
                false
            }
            Err(err) => return Err(err.into()),
        };
        let session = Self {
            id: Uuid::new_v4(),
            gate,
            local,
            poller,
            authenticated,
        };
        info!(session_id = %session.id, authenticated, "session started");
        Ok(session)
    }

    /// Session identifier, renewed on logout.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Returns whether the gate was passed.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Checks `password` and remembers a successful login on this device.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::WrongPassword`] on a mismatch and
    /// [`SessionError::Local`] when the flag cannot be stored.
    pub fn login(&mut self, password: &str) -> SessionResult<()> {
        if !self.gate.accepts(password) {
            warn!(session_id = %self.id, "login rejected");
            return Err(SessionError::WrongPassword);
        }
        save_json(self.local.as_ref(), LocalKey::Authenticated, &true)?;
        self.authenticated = true;
        info!(session_id = %self.id, "logged in");
        Ok(())
    }

    /// Starts notification polling for an authenticated session.
    ///
    /// Returns `false` when logged out or when polling already runs.
    #[must_use = "polling may not have started"]
    pub fn start_polling<R, C>(
        &self,
        tracker: Arc<NotificationTracker<R, C>>,
        visibility: watch::Receiver<PageVisibility>,
    ) -> bool
    where
        R: NotificationRepository + 'static,
        C: Clock + Send + Sync + 'static,
    {
        self.authenticated && self.poller.start(tracker, visibility)
    }

    /// Forgets the login, stops polling and starts a fresh session id.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Local`] when the flag cannot be removed.
    pub fn logout(&mut self) -> SessionResult<()> {
        self.poller.stop();
        self.local.remove(LocalKey::Authenticated)?;
        self.authenticated = false;
        let previous = std::mem::replace(&mut self.id, Uuid::new_v4());
        info!(session_id = %previous, "logged out");
        Ok(())
    }
}
