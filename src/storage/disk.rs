//! Scratch-directory page store
//!
//! The store only ever touches `<n>.html` files inside its root. Anything
//! else found there is left alone and reported as `Unmanaged`.

use crate::storage::traits::{PageStore, StorageError, StorageResult};
use std::ffi::OsStr;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Page store backed by one file per page in a scratch directory
#[derive(Debug, Clone)]
pub struct DiskPageStore {
    root: PathBuf,
}

impl DiskPageStore {
    /// Creates a store rooted at `root`
    ///
    /// The directory itself is created lazily by the first `put`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the scratch directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns true if the scratch directory exists on disk
    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }

    /// Fails with `Unmanaged` if the scratch directory holds anything
    /// besides page files
    pub fn ensure_owned(&self) -> StorageResult<()> {
        match self.unmanaged_entries()?.into_iter().next() {
            Some(entry) => Err(StorageError::Unmanaged(entry)),
            None => Ok(()),
        }
    }

    /// Lists the entries of the scratch directory that are not page files
    pub fn unmanaged_entries(&self) -> StorageResult<Vec<PathBuf>> {
        let mut unmanaged = Vec::new();
        for entry in self.entries()? {
            if !(is_page_file_name(&entry.file_name()) && entry.file_type()?.is_file()) {
                unmanaged.push(entry.path());
            }
        }
        unmanaged.sort();
        Ok(unmanaged)
    }

    fn entries(&self) -> StorageResult<Vec<fs::DirEntry>> {
        match fs::read_dir(&self.root) {
            Ok(dir) => Ok(dir.collect::<Result<_, _>>()?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn page_path(&self, page: u32) -> PathBuf {
        self.root.join(format!("{}.html", page))
    }
}

/// True for names of the form `<n>.html`
fn is_page_file_name(name: &OsStr) -> bool {
    name.to_str()
        .and_then(|name| name.strip_suffix(".html"))
        .map_or(false, |stem| stem.parse::<u32>().is_ok())
}

impl PageStore for DiskPageStore {
    fn put(&self, page: u32, markup: &str) -> StorageResult<()> {
        fs::create_dir_all(&self.root)?;

        // create_new makes the write-once rule atomic across workers
        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.page_path(page))
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(StorageError::AlreadyStored(page))
            }
            Err(e) => return Err(e.into()),
        };

        file.write_all(markup.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    fn get(&self, page: u32) -> StorageResult<String> {
        match fs::read_to_string(self.page_path(page)) {
            Ok(markup) => Ok(markup),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::PageNotFound(page)),
            Err(e) => Err(e.into()),
        }
    }

    fn contains(&self, page: u32) -> bool {
        self.page_path(page).is_file()
    }

    fn clear(&self) -> StorageResult<()> {
        for entry in self.entries()? {
            if is_page_file_name(&entry.file_name()) && entry.file_type()?.is_file() {
                fs::remove_file(entry.path())?;
            }
        }

        if !self.exists() {
            return Ok(());
        }
        if self.entries()?.is_empty() {
            fs::remove_dir(&self.root)?;
        } else {
            tracing::warn!(
                "Scratch directory {} still holds other files, leaving it in place",
                self.root.display()
            );
        }
        Ok(())
    }
}
