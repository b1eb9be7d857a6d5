//! Shelf-Harvest: a bookstore search-results harvester
//!
//! This crate crawls a paginated bookstore search listing, extracts one
//! record per book row, and writes the aggregated catalog as JSON and CSV.

pub mod config;
pub mod crawler;
pub mod output;
pub mod storage;

use thiserror::Error;

/// Main error type for Shelf-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error on page {page} ({url}): {reason}")]
    Transport {
        page: u32,
        url: String,
        reason: String,
    },

    #[error("Parse error on page {page}: {source}")]
    Parse { page: u32, source: ParseError },

    #[error("Page {page} is missing from the page store (its fetch failed earlier)")]
    MissingPage { page: u32 },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Fetch worker failed: {0}")]
    Worker(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Markup errors: an element the site layout promises is not there
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected element `{0}` not found")]
    MissingElement(&'static str),

    #[error("element `{element}` has no `{attribute}` attribute")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("expected a number in `{element}`, found '{text}'")]
    InvalidNumber { element: &'static str, text: String },

    #[error("row {row} has {found} columns, expected at least {expected}")]
    ShortRow {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("link '{href}' cannot be resolved against the site origin")]
    InvalidLink { href: String },

    #[error("invalid selector `{0}`")]
    InvalidSelector(&'static str),
}

impl ParseError {
    /// Attaches the page number the markup came from
    pub fn on_page(self, page: u32) -> HarvestError {
        HarvestError::Parse { page, source: self }
    }
}

/// Result type alias for Shelf-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for markup parsing
pub type ParseResult<T> = std::result::Result<T, ParseError>;

// Re-export commonly used types
pub use config::{Config, SearchContext};
pub use crawler::run_harvest;
pub use output::{BookRecord, HarvestSummary};
