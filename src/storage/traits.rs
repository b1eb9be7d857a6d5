//! Page store trait and error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during page store operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Page {0} not found in page store")]
    PageNotFound(u32),

    #[error("Page {0} is already stored")]
    AlreadyStored(u32),

    #[error("Scratch directory holds a file the page store does not own: {0}")]
    Unmanaged(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for raw page storage keyed by 1-based page number
///
/// Implementations must tolerate concurrent `put` calls for distinct pages
/// from several fetch workers.
pub trait PageStore: Send + Sync {
    /// Stores the markup of `page`
    ///
    /// Fails with `AlreadyStored` if the page was stored before; pages are
    /// never overwritten.
    fn put(&self, page: u32, markup: &str) -> StorageResult<()>;

    /// Reads back the markup of `page`
    ///
    /// Fails with `PageNotFound` if the page was never stored.
    fn get(&self, page: u32) -> StorageResult<String>;

    /// Returns true if `page` has been stored
    fn contains(&self, page: u32) -> bool;

    /// Removes every stored page, then the backing location once nothing
    /// else is left in it
    fn clear(&self) -> StorageResult<()>;
}
