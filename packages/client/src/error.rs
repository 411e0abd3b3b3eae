//! Storage error types for the disk cache
//!
//! Errors raised by [`DiskLruStore`](crate::disk::DiskLruStore). The
//! [`NetworkDiskCache`](crate::disk::NetworkDiskCache) adapter converts every one of them
//! into a cache miss or an aborted write, so only opening a store surfaces them to callers.

use crate::config::validation::ConfigurationError;

/// A Result alias where the Err case is [`StorageError`].
pub type Result<T> = std::result::Result<T, StorageError>;

/// Disk store error types for detailed error handling
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid cache key: {0}")]
    InvalidKey(String),
    #[error("Corrupt journal: {0}")]
    CorruptJournal(String),
    #[error("Entry is being edited: {0}")]
    EntryBusy(String),
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigurationError),
}
