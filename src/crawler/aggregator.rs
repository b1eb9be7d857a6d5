//! Catalog aggregation
//!
//! Walks the stored pages in ascending order and concatenates their
//! records, so the catalog is ordered by page and then by row.

use crate::crawler::extractor::extract_records;
use crate::output::BookRecord;
use crate::storage::{PageStore, StorageError};
use crate::HarvestError;
use url::Url;

/// Builds the full catalog from pages `1..=total_pages`
///
/// # Arguments
///
/// * `store` - Page store holding every fetched page
/// * `total_pages` - Page count found by pagination discovery
/// * `origin` - Site origin for resolving book links
///
/// # Returns
///
/// * `Ok(Vec<BookRecord>)` - Records of every page in page then row order
/// * `Err(HarvestError::MissingPage)` - A page is absent from the store
/// * `Err(HarvestError::Parse)` - A stored page does not match the layout
pub fn aggregate_catalog(
    store: &dyn PageStore,
    total_pages: u32,
    origin: &Url,
) -> Result<Vec<BookRecord>, HarvestError> {
    let mut catalog = Vec::new();

    for page in 1..=total_pages {
        let markup = store.get(page).map_err(|e| match e {
            StorageError::PageNotFound(page) => HarvestError::MissingPage { page },
            other => other.into(),
        })?;

        let records = extract_records(&markup, origin).map_err(|e| e.on_page(page))?;
        tracing::debug!("Page {}: {} records", page, records.len());
        catalog.extend(records);
    }

    tracing::info!(
        "Collected {} records from {} pages",
        catalog.len(),
        total_pages
    );
    Ok(catalog)
}
