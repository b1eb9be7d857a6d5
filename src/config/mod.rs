//! Configuration module for Shelf-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and freezing the result into the immutable [`SearchContext`] that
//! every pipeline component reads.
//!
//! # Example
//!
//! ```no_run
//! use shelf_harvest::config::{load_config, SearchContext};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! let context = SearchContext::new(config).unwrap();
//! println!("First page: {}", context.search_url());
//! ```

mod context;
mod parser;
mod types;
mod validation;

pub use context::SearchContext;
pub use types::{Config, CrawlerConfig, OutputConfig, SearchConfig};

pub use parser::{
    compute_config_hash, config_hash, load_config, load_config_with_hash, parse_config,
};
pub use validation::validate;
