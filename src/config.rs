//! Storage configuration.
//!
//! Holds where the friendship database lives and how long a transaction
//! waits on a competing writer before giving up.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::friendship::{FriendshipError, FriendshipStorage, Result};

/// File name of the friendship database inside the data directory.
pub const DATABASE_FILE_NAME: &str = "friendships.db";

/// Default time a transaction waits for the write lock.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for the friendship store.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Path to the directory where the database will be stored.
    pub data_dir: PathBuf,
    /// How long to wait for a competing writer before failing.
    pub busy_timeout: Duration,
}

impl StorageConfig {
    /// Creates a new storage configuration.
    ///
    /// # Arguments
    ///
    /// * `data_dir` - Path to the directory where the database will be stored.
    ///   The directory will be created if it doesn't exist.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    /// Sets the busy timeout.
    #[must_use]
    pub const fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    /// Returns the path to the `SQLite` database file.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE_NAME)
    }

    /// Creates the data directory and opens the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the database
    /// cannot be opened and initialized.
    pub fn create_storage(&self) -> Result<FriendshipStorage> {
        std::fs::create_dir_all(&self.data_dir).map_err(|e| {
            FriendshipError::StorageUnavailable(format!(
                "Failed to create data directory {}: {e}",
                self.data_dir.display()
            ))
        })?;

        FriendshipStorage::open(&self.database_path(), self.busy_timeout)
    }
}
