//! Output record type, sink trait and error types
//!
//! This module defines the book record every page extraction produces and
//! the trait interface the result sinks implement.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Output file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Discount block of a book row
///
/// Only present when the row shows an old (crossed-out) price, so the amount
/// and the old price always travel together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    /// Discount as shown by the site (e.g. "-30%")
    pub discount_amount: String,

    /// Price before the discount
    pub old_price: String,
}

/// One book extracted from a results table row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub title: String,

    /// Absolute URL of the book page
    pub link: String,

    pub author: String,

    /// Publisher with all whitespace runs collapsed to single spaces
    pub publisher: String,

    /// Current price
    pub price: String,

    #[serde(flatten)]
    pub discount: Option<Discount>,

    pub availability: String,
}

impl BookRecord {
    pub fn discount_amount(&self) -> Option<&str> {
        self.discount.as_ref().map(|d| d.discount_amount.as_str())
    }

    pub fn old_price(&self) -> Option<&str> {
        self.discount.as_ref().map(|d| d.old_price.as_str())
    }

    /// Returns true if the row carried a discount
    pub fn is_discounted(&self) -> bool {
        self.discount.is_some()
    }
}

/// Trait for result sinks
///
/// A sink renders the full ordered catalog into one output representation.
pub trait ResultSink {
    /// File extension of the artifact, without the dot
    fn extension(&self) -> &'static str;

    /// Writes every record, in order, to `writer`
    ///
    /// # Arguments
    ///
    /// * `records` - The aggregated catalog
    /// * `writer` - Destination for the rendered document
    fn write_records(&self, records: &[BookRecord], writer: &mut dyn Write) -> OutputResult<()>;
}
