//! Storage module for raw page markup
//!
//! This module handles the scratch directory that holds every fetched
//! results page between the fetch phase and the extraction phase:
//! - One UTF-8 file per page, named `<page>.html`
//! - Lazy creation of the directory on first write
//! - Write-once keys, so concurrent workers never contend
//! - Removal of the whole directory at the end of a run

mod disk;
mod traits;

pub use disk::DiskPageStore;
pub use traits::{PageStore, StorageError, StorageResult};
