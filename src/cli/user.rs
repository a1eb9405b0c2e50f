//! User CLI commands
//!
//! Registration and the credential lookup used by every command that needs
//! a logged-in user.

use crate::error::{TrackerError, TrackerResult};
use crate::session::Session;

/// Environment variable holding the login email
pub const EMAIL_ENV: &str = "EXPENSE_TRACKER_EMAIL";

/// Environment variable holding the password, read instead of prompting
pub const PASSWORD_ENV: &str = "EXPENSE_TRACKER_PASSWORD";

/// Read a password without echo, or from the environment when set
pub fn read_password(prompt: &str) -> TrackerResult<String> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return Ok(password);
    }

    rpassword::prompt_password(prompt)
        .map_err(|e| TrackerError::Io(format!("Failed to read password: {}", e)))
}

fn require_email(email: Option<String>) -> TrackerResult<String> {
    email.ok_or_else(|| {
        TrackerError::Validation(format!("No email given. Use --email or set {}", EMAIL_ENV))
    })
}

/// Log the session in with `email` and a password from the environment or a
/// prompt
pub fn authenticate(session: &mut Session, email: Option<String>) -> TrackerResult<()> {
    let email = require_email(email)?;
    let password = read_password("Password: ")?;
    session.login(&email, &password)?;
    Ok(())
}

/// Handle the register command
pub fn handle_register_command(session: &Session, email: Option<String>) -> TrackerResult<()> {
    let email = require_email(email)?;
    let password = read_password("Password: ")?;
    let confirm = if std::env::var(PASSWORD_ENV).is_ok() {
        password.clone()
    } else {
        read_password("Confirm password: ")?
    };

    let user = session.register(&email, &password, &confirm)?;
    println!("Registered {}. You can now log in.", user.email);
    Ok(())
}
