//! Crawler module for fetching and reading results pages
//!
//! This module contains the harvest pipeline, including:
//! - HTTP fetching with a browser-like header set
//! - Pagination discovery on the first page
//! - A bounded worker pool for the remaining pages
//! - Positional record extraction from the results table
//! - Ordered aggregation across pages
//! - Overall run coordination

mod aggregator;
mod coordinator;
mod extractor;
mod fetcher;
mod markup;
mod pagination;
mod pool;

pub use aggregator::aggregate_catalog;
pub use coordinator::{run_harvest, Harvester};
pub use extractor::{extract_records, RecordExtractor};
pub use fetcher::{browser_headers, build_http_client, PageFetcher, DEFAULT_USER_AGENT};
pub use markup::collapse_whitespace;
pub use pagination::{discover_pagination, Pagination};
pub use pool::{FailedPage, FetchPool, PoolReport};
