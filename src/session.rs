//! Session state
//!
//! Everything that lives for the length of one sitting: who is logged in,
//! the loaded ledger, and whether a logout is waiting for confirmation. The
//! ledger is loaded on first use and kept until logout or an explicit
//! reload; every mutation writes through to disk, so the cached copy never
//! drifts from the file.

use crate::error::{TrackerError, TrackerResult};
use crate::models::User;
use crate::services::AuthService;
use crate::storage::{Storage, TransactionRepository};

/// An authenticated (or not yet authenticated) sitting
pub struct Session {
    storage: Storage,
    user: Option<String>,
    ledger: Option<TransactionRepository>,
    logout_pending: bool,
}

impl Session {
    /// Start a session with nobody logged in
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            user: None,
            ledger: None,
            logout_pending: false,
        }
    }

    /// Underlying storage
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Register a new user. Does not log them in.
    pub fn register(&self, email: &str, password: &str, confirm: &str) -> TrackerResult<User> {
        AuthService::new(&self.storage.users).register(email, password, confirm)
    }

    /// Log in, replacing any current user
    pub fn login(&mut self, email: &str, password: &str) -> TrackerResult<User> {
        let user = AuthService::new(&self.storage.users).login(email, password)?;

        if self.user.as_deref() != Some(email) {
            self.ledger = None;
        }
        self.user = Some(user.email.clone());
        self.logout_pending = false;

        Ok(user)
    }

    /// Check if a user is logged in
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Email of the logged in user, or [TrackerError::NotAuthenticated]
    pub fn require_auth(&self) -> TrackerResult<&str> {
        self.user.as_deref().ok_or(TrackerError::NotAuthenticated)
    }

    /// The ledger, loaded from disk on first access
    pub fn ledger(&mut self) -> TrackerResult<&mut TransactionRepository> {
        self.require_auth()?;

        let ledger = match self.ledger.take() {
            Some(ledger) => ledger,
            None => {
                let mut ledger = self.storage.transactions();
                ledger.load()?;
                ledger
            }
        };

        Ok(self.ledger.insert(ledger))
    }

    /// Drop the cached ledger so the next access rereads the file.
    /// Transaction ids are reassigned on reload.
    pub fn invalidate_ledger(&mut self) {
        self.ledger = None;
    }

    /// Check whether the ledger is currently cached
    pub fn has_cached_ledger(&self) -> bool {
        self.ledger.is_some()
    }

    /// Ask to log out. Nothing changes until [Self::confirm_logout].
    pub fn request_logout(&mut self) -> TrackerResult<()> {
        self.require_auth()?;
        self.logout_pending = true;
        Ok(())
    }

    /// Check if a logout is waiting for confirmation
    pub fn is_logout_pending(&self) -> bool {
        self.logout_pending
    }

    /// Complete a requested logout, returning who was logged out.
    ///
    /// Does nothing unless a logout was requested.
    pub fn confirm_logout(&mut self) -> Option<String> {
        if !self.logout_pending {
            return None;
        }

        self.logout_pending = false;
        self.ledger = None;
        let user = self.user.take();
        if let Some(email) = &user {
            tracing::info!(email = %email, "logged out");
        }
        user
    }

    /// Abandon a requested logout
    pub fn cancel_logout(&mut self) {
        self.logout_pending = false;
    }
}
