//! Storage layer for the expense tracker
//!
//! Two independent stores: a SQLite credential database and a CSV ledger
//! file written atomically in full.

pub mod file_io;
pub mod transactions;
pub mod users;

pub use file_io::write_atomic;
pub use transactions::{read_transactions, write_transactions, TransactionRepository};
pub use users::UserRepository;

use crate::config::paths::TrackerPaths;
use crate::error::TrackerError;

/// Main storage coordinator
pub struct Storage {
    paths: TrackerPaths,
    pub users: UserRepository,
}

impl Storage {
    /// Create a new Storage instance, creating the data directory and the
    /// users table if needed
    pub fn new(paths: TrackerPaths) -> Result<Self, TrackerError> {
        paths.ensure_directories()?;

        Ok(Self {
            users: UserRepository::open(paths.users_db())?,
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &TrackerPaths {
        &self.paths
    }

    /// A fresh ledger repository for the transactions file. Not yet loaded.
    pub fn transactions(&self) -> TransactionRepository {
        TransactionRepository::new(self.paths.transactions_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_storage_creation() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("tracker");
        let paths = TrackerPaths::with_base_dir(base.clone());
        let storage = Storage::new(paths).unwrap();

        assert!(base.join("users.db").exists());
        assert_eq!(storage.users.count().unwrap(), 0);
        assert_eq!(
            storage.transactions().path(),
            base.join("transactions.csv").as_path()
        );
    }
}
