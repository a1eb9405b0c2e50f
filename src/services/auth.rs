//! Authentication service
//!
//! Registration and login on top of the credential store.

use crate::error::{TrackerError, TrackerResult};
use crate::models::User;
use crate::storage::UserRepository;

/// Service for registering and logging in users
pub struct AuthService<'a> {
    users: &'a UserRepository,
}

impl<'a> AuthService<'a> {
    /// Create a new auth service
    pub fn new(users: &'a UserRepository) -> Self {
        Self { users }
    }

    /// Register a new user.
    ///
    /// `confirm` must match `password`. An email that is already registered
    /// is rejected and the existing password is left unchanged.
    pub fn register(&self, email: &str, password: &str, confirm: &str) -> TrackerResult<User> {
        if password != confirm {
            return Err(TrackerError::Validation("Passwords do not match".into()));
        }

        if !self.users.register(email, password)? {
            tracing::warn!(email, "registration rejected, email already in use");
            return Err(TrackerError::user_exists(email));
        }

        let user = self
            .users
            .get_by_email(email)?
            .ok_or_else(|| TrackerError::Database(format!("User vanished after insert: {}", email)))?;

        tracing::info!(user_id = %user.id, email, "registered user");
        Ok(user)
    }

    /// Check credentials and return the matching user.
    ///
    /// Failure never reveals whether the email or the password was wrong.
    pub fn login(&self, email: &str, password: &str) -> TrackerResult<User> {
        if !self.users.verify(email, password)? {
            tracing::warn!(email, "login failed");
            return Err(TrackerError::AuthenticationFailed);
        }

        let user = self
            .users
            .get_by_email(email)?
            .ok_or(TrackerError::AuthenticationFailed)?;

        tracing::info!(user_id = %user.id, "login succeeded");
        Ok(user)
    }
}
