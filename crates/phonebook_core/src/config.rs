//! Store connection configuration.
//!
//! # Responsibility
//! - Describe where the phonebook database lives and how to connect to it.
//!
//! # Invariants
//! - Configuration is owned by the caller and passed to `open_db`; core keeps
//!   no process-global connection settings.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default time a connection waits on a locked database before failing.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Physical location of the phonebook database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    /// On-disk SQLite file, created when missing.
    File(PathBuf),
    /// Private in-memory database, discarded when the connection closes.
    Memory,
}

impl DatabaseLocation {
    /// Short label used in log events.
    pub fn mode(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Memory => "memory",
        }
    }
}

/// Connection settings for the phonebook store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub location: DatabaseLocation,
    /// How long a write waits for another process holding the lock.
    pub busy_timeout: Duration,
}

impl StoreConfig {
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self {
            location: DatabaseLocation::File(path.as_ref().to_path_buf()),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    pub fn in_memory() -> Self {
        Self {
            location: DatabaseLocation::Memory,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }
}
