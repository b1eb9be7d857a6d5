//! Harvest coordinator - main run orchestration logic
//!
//! This module drives one complete harvest:
//! - Preparing the scratch page store
//! - Fetching and storing the first page
//! - Discovering the page and result counts
//! - Fetching the remaining pages through the worker pool
//! - Aggregating records and writing the JSON and CSV outputs
//! - Tearing the page store down

use crate::config::SearchContext;
use crate::crawler::aggregator::aggregate_catalog;
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::pagination::discover_pagination;
use crate::crawler::pool::FetchPool;
use crate::output::{write_catalog, HarvestSummary};
use crate::storage::{DiskPageStore, PageStore};
use crate::HarvestError;
use std::sync::Arc;
use std::time::Instant;

/// Main harvest coordinator structure
pub struct Harvester {
    context: Arc<SearchContext>,
    fetcher: PageFetcher,
    store: Arc<DiskPageStore>,
}

impl Harvester {
    /// Creates a new harvester for `context`
    ///
    /// # Returns
    ///
    /// * `Ok(Harvester)` - HTTP client built, store bound to the scratch dir
    /// * `Err(HarvestError)` - The HTTP client could not be built
    pub fn new(context: Arc<SearchContext>) -> Result<Self, HarvestError> {
        let fetcher = PageFetcher::new(Arc::clone(&context))?;
        let store = Arc::new(DiskPageStore::new(context.scratch_dir().clone()));

        Ok(Self {
            context,
            fetcher,
            store,
        })
    }

    /// Runs the harvest to completion
    ///
    /// Any failure on the first page, during pagination discovery or during
    /// aggregation aborts the run. A pre-existing scratch directory holding
    /// anything besides page files aborts it before the first request. The
    /// scratch directory is only removed after the outputs have been
    /// written, and is left behind on failure.
    pub async fn run(&self) -> Result<HarvestSummary, HarvestError> {
        let started = Instant::now();
        tracing::info!("Starting harvest for query '{}'", self.context.query());

        if self.store.exists() {
            self.store.ensure_owned()?;
            tracing::warn!(
                "Removing stale scratch directory {}",
                self.store.root().display()
            );
            self.store.clear()?;
        }

        let first_page = self.fetcher.fetch(1).await?;
        self.store.put(1, &first_page)?;
        tracing::info!("Page 1 fetched and stored");

        let pagination = discover_pagination(&first_page).map_err(|e| e.on_page(1))?;
        tracing::info!("Pages found: {}", pagination.total_pages);
        tracing::info!("Results reported: {}", pagination.total_results);

        if pagination.total_pages > 1 {
            let pool = FetchPool::new(
                self.fetcher.clone(),
                Arc::clone(&self.store),
                self.context.worker_count(),
            );
            let report = pool.run(2..=pagination.total_pages).await?;
            if report.is_complete() {
                tracing::info!("All {} pages stored", pagination.total_pages);
            } else {
                let failed: Vec<u32> = report.failed.iter().map(|f| f.page).collect();
                tracing::warn!("Pages not stored: {:?}", failed);
            }
        }

        let catalog = aggregate_catalog(
            self.store.as_ref(),
            pagination.total_pages,
            self.context.origin(),
        )?;

        if catalog.len() as u64 != pagination.total_results {
            tracing::warn!(
                "Site reported {} results but {} records were extracted",
                pagination.total_results,
                catalog.len()
            );
        }

        let outputs = write_catalog(&catalog, self.context.output_dir(), &chrono::Local::now())?;

        if self.context.keep_scratch() {
            tracing::info!("Keeping scratch directory {}", self.store.root().display());
        } else {
            self.store.clear()?;
        }

        let summary = HarvestSummary {
            query: self.context.query().to_string(),
            total_pages: pagination.total_pages,
            reported_results: pagination.total_results,
            records: catalog.len(),
            discounted: catalog.iter().filter(|r| r.is_discounted()).count(),
            outputs,
            elapsed: started.elapsed(),
        };

        tracing::info!(
            "Harvest completed: {} records in {:?}",
            summary.records,
            summary.elapsed
        );
        Ok(summary)
    }
}

/// Runs a complete harvest for `context`
///
/// # Example
///
/// ```no_run
/// use shelf_harvest::config::{Config, SearchContext};
/// use shelf_harvest::crawler::run_harvest;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let context = Arc::new(SearchContext::new(Config::default())?);
/// let summary = run_harvest(context).await?;
/// println!("{} books", summary.records);
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest(context: Arc<SearchContext>) -> Result<HarvestSummary, HarvestError> {
    Harvester::new(context)?.run().await
}
