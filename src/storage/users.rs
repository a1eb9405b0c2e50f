//! SQLite backed credential store
//!
//! One table, `users(id, email, password)`. Passwords are stored as given.

use std::path::Path;

use rusqlite::{Connection, ErrorCode, OptionalExtension, Row};

use crate::error::TrackerError;
use crate::models::{User, UserId};

/// Handles registration and verification of users.
pub struct UserRepository {
    connection: Connection,
}

impl UserRepository {
    /// Open (or create) the database at `path` and make sure the schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, TrackerError> {
        let connection = Connection::open(path.as_ref())?;
        Self::from_connection(connection)
    }

    /// An in-memory store, used by tests.
    pub fn open_in_memory() -> Result<Self, TrackerError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(connection: Connection) -> Result<Self, TrackerError> {
        create_table(&connection)?;
        Ok(Self { connection })
    }

    /// Insert a new user.
    ///
    /// Returns `Ok(false)` without touching the existing row when `email` is
    /// already registered.
    ///
    /// # Errors
    ///
    /// Returns [TrackerError::Database] for any other SQL failure.
    pub fn register(&self, email: &str, password: &str) -> Result<bool, TrackerError> {
        let result = self.connection.execute(
            "INSERT INTO users (email, password) VALUES (?1, ?2)",
            (email, password),
        );

        match result {
            Ok(_) => {
                tracing::debug!(user_id = self.connection.last_insert_rowid(), "registered user");
                Ok(true)
            }
            Err(rusqlite::Error::SqliteFailure(sql_error, _))
                if sql_error.code == ErrorCode::ConstraintViolation =>
            {
                tracing::debug!("registration rejected, email already in use");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// True iff a user with exactly this email and password exists.
    pub fn verify(&self, email: &str, password: &str) -> Result<bool, TrackerError> {
        self.connection
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1 AND password = ?2)",
                (email, password),
                |row| row.get(0),
            )
            .map_err(TrackerError::from)
    }

    /// Get the user registered with `email`, if any.
    pub fn get_by_email(&self, email: &str) -> Result<Option<User>, TrackerError> {
        self.connection
            .query_row(
                "SELECT id, email, password FROM users WHERE email = ?1",
                [email],
                map_row,
            )
            .optional()
            .map_err(TrackerError::from)
    }

    /// Number of registered users.
    pub fn count(&self) -> Result<usize, TrackerError> {
        let count: i64 = self
            .connection
            .query_row("SELECT COUNT(id) FROM users", [], |row| row.get(0))?;

        usize::try_from(count)
            .map_err(|_| TrackerError::Storage(format!("Invalid user count: {}", count)))
    }
}

/// Create the users table. Safe to call on an existing database.
pub fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT UNIQUE NOT NULL,
                password TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<User, rusqlite::Error> {
    let id: i64 = row.get(0)?;
    let email: String = row.get(1)?;
    let password: String = row.get(2)?;

    Ok(User::new(UserId::new(id), email, password))
}
