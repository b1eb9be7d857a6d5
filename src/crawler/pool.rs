//! Bounded fetch pool
//!
//! Pages 2..N are pushed onto a queue up front; a fixed number of workers
//! drain it, each fetching a page and writing it to the page store. Pages
//! finish in any order. Store keys are disjoint, so workers share nothing
//! but the queue.
//!
//! A failed page is logged and left out of the store. The pool never
//! retries; the aggregation step reports the gap.

use crate::crawler::fetcher::PageFetcher;
use crate::storage::PageStore;
use crate::HarvestError;
use std::ops::RangeInclusive;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;

/// A page the pool could not fetch or store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedPage {
    pub page: u32,
    pub reason: String,
}

/// Outcome of one pool run, sorted by page number
#[derive(Debug, Clone, Default)]
pub struct PoolReport {
    /// Pages written to the store
    pub stored: Vec<u32>,

    /// Pages that are absent from the store
    pub failed: Vec<FailedPage>,
}

impl PoolReport {
    /// Returns true if every dispatched page was stored
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

type PageQueue = Arc<Mutex<mpsc::Receiver<u32>>>;

/// Fixed-size pool of fetch-and-store workers
pub struct FetchPool<S> {
    fetcher: PageFetcher,
    store: Arc<S>,
    workers: usize,
}

impl<S> FetchPool<S>
where
    S: PageStore + 'static,
{
    /// Creates a pool of `workers` concurrent workers (at least one)
    pub fn new(fetcher: PageFetcher, store: Arc<S>, workers: usize) -> Self {
        Self {
            fetcher,
            store,
            workers: workers.max(1),
        }
    }

    /// Fetches and stores every page in `pages`
    ///
    /// Returns once all workers have drained the queue. Individual page
    /// failures are collected in the report; only a panicked or cancelled
    /// worker makes the whole run fail.
    pub async fn run(&self, pages: RangeInclusive<u32>) -> Result<PoolReport, HarvestError> {
        let pages: Vec<u32> = pages.collect();
        if pages.is_empty() {
            return Ok(PoolReport::default());
        }

        let (sender, receiver) = mpsc::channel(pages.len());
        for &page in &pages {
            sender
                .try_send(page)
                .map_err(|e| HarvestError::Worker(format!("failed to queue page: {}", e)))?;
        }
        drop(sender);

        let queue: PageQueue = Arc::new(Mutex::new(receiver));
        let worker_count = self.workers.min(pages.len());
        tracing::info!(
            "Fetching {} pages with {} workers",
            pages.len(),
            worker_count
        );

        let mut workers = JoinSet::new();
        for worker in 0..worker_count {
            let queue = Arc::clone(&queue);
            let fetcher = self.fetcher.clone();
            let store = Arc::clone(&self.store);
            workers.spawn(drain_queue(worker, queue, fetcher, store));
        }

        let mut report = PoolReport::default();
        while let Some(joined) = workers.join_next().await {
            let outcomes = joined.map_err(|e| HarvestError::Worker(e.to_string()))?;
            for (page, outcome) in outcomes {
                match outcome {
                    Ok(()) => report.stored.push(page),
                    Err(reason) => report.failed.push(FailedPage { page, reason }),
                }
            }
        }

        report.stored.sort_unstable();
        report.failed.sort_by_key(|failed| failed.page);
        Ok(report)
    }
}

/// Worker loop: take the next page until the queue is empty
async fn drain_queue<S: PageStore>(
    worker: usize,
    queue: PageQueue,
    fetcher: PageFetcher,
    store: Arc<S>,
) -> Vec<(u32, Result<(), String>)> {
    let mut outcomes = Vec::new();

    loop {
        let next = queue.lock().await.recv().await;
        let Some(page) = next else {
            break;
        };

        let outcome = fetch_and_store(&fetcher, store.as_ref(), page).await;
        match &outcome {
            Ok(()) => tracing::info!("Page {} fetched and stored", page),
            Err(reason) => tracing::warn!("Page {} was not stored: {}", page, reason),
        }
        outcomes.push((page, outcome));
    }

    tracing::debug!("Worker {} finished after {} pages", worker, outcomes.len());
    outcomes
}

async fn fetch_and_store<S: PageStore>(
    fetcher: &PageFetcher,
    store: &S,
    page: u32,
) -> Result<(), String> {
    let markup = fetcher.fetch(page).await.map_err(|e| e.to_string())?;
    store.put(page, &markup).map_err(|e| e.to_string())
}
