//! Integration tests for the harvester
//!
//! These tests use wiremock to stand in for the bookstore and run the full
//! fetch, extract and write cycle end-to-end.

use shelf_harvest::config::{Config, SearchContext};
use shelf_harvest::crawler::{run_harvest, FetchPool, PageFetcher};
use shelf_harvest::output::{BookRecord, CSV_HEADER};
use shelf_harvest::storage::{DiskPageStore, PageStore, StorageError};
use shelf_harvest::{ConfigError, HarvestError};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const SEARCH_PATH: &str = "/search/java/";

/// Creates a test context pointing at the mock server
fn create_test_context(base_url: &str, dir: &Path, workers: u32) -> Arc<SearchContext> {
    let mut config = Config::default();
    config.search.origin = base_url.to_string();
    config.crawler.worker_count = workers;
    config.crawler.request_timeout_secs = 5;
    config.output.scratch_dir = dir.join("scratch").display().to_string();
    config.output.output_dir = dir.join("out").display().to_string();
    Arc::new(SearchContext::new(config).expect("valid test config"))
}

fn book_row(id: u32, discounted: bool) -> String {
    let price = if discounted {
        r#"<span class="price-val" title="-30%"><span>350</span></span>
           <span class="price-old"><span class="price-gray">500</span></span>"#
    } else {
        r#"<span class="price-val"><span>500</span></span>"#
    };
    format!(
        r#"<tr>
            <td><a href="/books/{id}/">Book {id}</a></td>
            <td>Author {id}</td>
            <td>Press
                House</td>
            <td>{price}</td>
            <td>In stock</td>
        </tr>"#
    )
}

fn results_page(
    ids: std::ops::RangeInclusive<u32>,
    discounted: &[u32],
    pages: u32,
    total: u64,
) -> String {
    let rows: String = ids.map(|id| book_row(id, discounted.contains(&id))).collect();
    let pager: String = (1..=pages)
        .map(|n| format!(r#"<div class="pagination-number">{}</div>"#, n))
        .collect();
    format!(
        r#"<html><body>
        <div class="b-stab-e-wrapper-container">
            <span class="b-stab-e-slider-item-e-txt-m-small js-search-tab-count">{total}</span>
        </div>
        <table><tbody class="products-table__body">{rows}</tbody></table>
        <div class="pagination-numbers__right">{pager}</div>
        </body></html>"#
    )
}

/// Mounts page `n` (n > 1) of the search
async fn mount_page(server: &MockServer, page: u32, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("page", page.to_string()))
        .respond_with(template)
        .mount(server)
        .await;
}

/// Mounts the first page; must be mounted after the numbered pages so
/// they take precedence
async fn mount_first_page(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("display", "table"))
        .and(query_param("id_genre", "-1"))
        .respond_with(template)
        .mount(server)
        .await;
}

fn output_file(dir: &Path, extension: &str) -> PathBuf {
    std::fs::read_dir(dir.join("out"))
        .expect("output dir exists")
        .map(|entry| entry.unwrap().path())
        .find(|p| p.extension().and_then(|e| e.to_str()) == Some(extension))
        .expect("output file written")
}

#[tokio::test]
async fn test_two_page_harvest() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        2,
        ResponseTemplate::new(200).set_body_string(results_page(21..=25, &[], 2, 25)),
    )
    .await;
    mount_first_page(
        &mock_server,
        ResponseTemplate::new(200).set_body_string(results_page(1..=20, &[1], 2, 25)),
    )
    .await;

    let context = create_test_context(&mock_server.uri(), dir.path(), 5);
    let summary = run_harvest(context).await.expect("harvest succeeds");

    assert_eq!(summary.total_pages, 2);
    assert_eq!(summary.reported_results, 25);
    assert_eq!(summary.records, 25);
    assert_eq!(summary.discounted, 1);
    assert_eq!(summary.outputs.len(), 2);

    // Scratch directory is gone after a successful run
    assert!(!dir.path().join("scratch").exists());

    let json = std::fs::read_to_string(output_file(dir.path(), "json")).unwrap();
    let records: Vec<BookRecord> = serde_json::from_str(&json).unwrap();
    assert_eq!(records.len(), 25);
    assert_eq!(records[0].discount_amount(), Some("-30%"));
    assert_eq!(records[0].old_price(), Some("500"));
    assert!(records[20..].iter().all(|r| r.discount_amount().is_none()));
    assert_eq!(records[0].link, format!("{}/books/1/", mock_server.uri()));
    assert_eq!(records[24].title, "Book 25");
    assert_eq!(records[3].publisher, "Press House");

    let csv = std::fs::read_to_string(output_file(dir.path(), "csv")).unwrap();
    assert_eq!(csv.lines().count(), 26);
    assert_eq!(csv.lines().next().unwrap(), CSV_HEADER.join(","));
}

#[tokio::test]
async fn test_output_names_share_timestamp() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_first_page(
        &mock_server,
        ResponseTemplate::new(200).set_body_string(results_page(1..=3, &[], 1, 3)),
    )
    .await;

    let context = create_test_context(&mock_server.uri(), dir.path(), 2);
    let summary = run_harvest(context).await.unwrap();

    let stems: Vec<String> = summary
        .outputs
        .iter()
        .map(|p| p.file_stem().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(stems[0], stems[1]);
    assert!(stems[0].starts_with("result_"));
    assert_eq!(stems[0].len(), "result_YYYYMMDD_HH_MM_SS".len());
}

#[tokio::test]
async fn test_missing_pool_page_aborts_aggregation() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    for page in 2..=7u32 {
        let template = if page == 4 {
            ResponseTemplate::new(404)
        } else {
            let first = (page - 1) * 2 + 1;
            ResponseTemplate::new(200)
                .set_body_string(results_page(first..=first + 1, &[], 7, 14))
        };
        mount_page(&mock_server, page, template).await;
    }
    mount_first_page(
        &mock_server,
        ResponseTemplate::new(200).set_body_string(results_page(1..=2, &[], 7, 14)),
    )
    .await;

    let context = create_test_context(&mock_server.uri(), dir.path(), 3);
    let err = run_harvest(context).await.unwrap_err();

    assert!(
        matches!(err, HarvestError::MissingPage { page: 4 }),
        "unexpected error: {}",
        err
    );

    // Nothing is written, and the fetched pages stay for inspection
    assert!(!dir.path().join("out").exists());
    let store = DiskPageStore::new(dir.path().join("scratch"));
    for page in [1, 2, 3, 5, 6, 7] {
        assert!(store.contains(page), "page {} should be stored", page);
    }
    assert!(!store.contains(4));
}

#[tokio::test]
async fn test_first_page_transport_error_is_fatal() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_first_page(&mock_server, ResponseTemplate::new(503)).await;

    let context = create_test_context(&mock_server.uri(), dir.path(), 5);
    let err = run_harvest(context).await.unwrap_err();

    match err {
        HarvestError::Transport { page, reason, .. } => {
            assert_eq!(page, 1);
            assert!(reason.contains("503"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_first_page_without_pager_is_fatal() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_first_page(
        &mock_server,
        ResponseTemplate::new(200).set_body_string("<html><body>Site redesign</body></html>"),
    )
    .await;

    let context = create_test_context(&mock_server.uri(), dir.path(), 5);
    let err = run_harvest(context).await.unwrap_err();

    assert!(matches!(err, HarvestError::Parse { page: 1, .. }));
}

#[tokio::test]
async fn test_stale_scratch_directory_is_replaced() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let stale = DiskPageStore::new(dir.path().join("scratch"));
    stale.put(1, "stale page from an earlier crash").unwrap();

    mount_first_page(
        &mock_server,
        ResponseTemplate::new(200).set_body_string(results_page(1..=2, &[], 1, 2)),
    )
    .await;

    let mut config = Config::default();
    config.search.origin = mock_server.uri();
    config.output.scratch_dir = dir.path().join("scratch").display().to_string();
    config.output.output_dir = dir.path().join("out").display().to_string();
    config.output.keep_scratch = true;
    let context = Arc::new(SearchContext::new(config).unwrap());

    let summary = run_harvest(context).await.unwrap();
    assert_eq!(summary.records, 2);

    // keep-scratch leaves the fresh copy of page 1 behind
    let page_one = stale.get(1).unwrap();
    assert!(page_one.contains("products-table__body"));
}

#[tokio::test]
async fn test_fetcher_sends_browser_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(header("user-agent", "ShelfBot/2.0"))
        .and(header("upgrade-insecure-requests", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = Config::default();
    config.search.origin = mock_server.uri();
    config.crawler.user_agent = Some("ShelfBot/2.0".to_string());
    let context = Arc::new(SearchContext::new(config).unwrap());

    let fetcher = PageFetcher::new(context).unwrap();
    assert_eq!(fetcher.fetch(1).await.unwrap(), "ok");
}

#[tokio::test]
async fn test_pool_stores_every_page() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    for page in 2..=9u32 {
        mount_page(
            &mock_server,
            page,
            ResponseTemplate::new(200).set_body_string(format!("page {}", page)),
        )
        .await;
    }

    let context = create_test_context(&mock_server.uri(), dir.path(), 3);
    let fetcher = PageFetcher::new(Arc::clone(&context)).unwrap();
    let store = Arc::new(DiskPageStore::new(context.scratch_dir().clone()));
    let pool = FetchPool::new(fetcher, Arc::clone(&store), context.worker_count());

    let report = pool.run(2..=9).await.unwrap();

    assert!(report.is_complete());
    assert_eq!(report.stored, (2..=9).collect::<Vec<u32>>());
    for page in 2..=9u32 {
        assert_eq!(store.get(page).unwrap(), format!("page {}", page));
    }
    assert!(!store.contains(1));
}

#[tokio::test]
async fn test_pool_reports_failed_pages() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&mock_server, 2, ResponseTemplate::new(200).set_body_string("two")).await;
    mount_page(&mock_server, 3, ResponseTemplate::new(500)).await;
    mount_page(&mock_server, 4, ResponseTemplate::new(404)).await;

    let context = create_test_context(&mock_server.uri(), dir.path(), 2);
    let fetcher = PageFetcher::new(Arc::clone(&context)).unwrap();
    let store = Arc::new(DiskPageStore::new(context.scratch_dir().clone()));
    let pool = FetchPool::new(fetcher, Arc::clone(&store), context.worker_count());

    let report = pool.run(2..=4).await.unwrap();

    assert_eq!(report.stored, vec![2]);
    let failed: Vec<u32> = report.failed.iter().map(|f| f.page).collect();
    assert_eq!(failed, vec![3, 4]);
    assert!(report.failed[1].reason.contains("404"));
}

#[test]
fn test_scratch_dir_cannot_hold_outputs() {
    let dir = TempDir::new().unwrap();
    let shared = dir.path().join("shared").display().to_string();

    let mut config = Config::default();
    config.output.scratch_dir = shared.clone();
    config.output.output_dir = shared.clone();
    assert!(matches!(
        SearchContext::new(config.clone()),
        Err(ConfigError::Validation(_))
    ));

    config.output.output_dir = format!("{}/results", shared);
    assert!(matches!(
        SearchContext::new(config),
        Err(ConfigError::Validation(_))
    ));
}

#[tokio::test]
async fn test_foreign_files_in_scratch_abort_before_fetching() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let scratch = dir.path().join("scratch");
    std::fs::create_dir_all(&scratch).unwrap();
    std::fs::write(scratch.join("my_notes.txt"), "do not delete").unwrap();
    std::fs::write(scratch.join("3.html"), "old page").unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let context = create_test_context(&mock_server.uri(), dir.path(), 2);
    let err = run_harvest(context).await.unwrap_err();

    assert!(
        matches!(err, HarvestError::Storage(StorageError::Unmanaged(ref p)) if p.ends_with("my_notes.txt")),
        "unexpected error: {}",
        err
    );
    assert_eq!(
        std::fs::read_to_string(scratch.join("my_notes.txt")).unwrap(),
        "do not delete"
    );
    assert!(scratch.join("3.html").is_file());
}

#[tokio::test]
async fn test_scratch_inside_output_dir_keeps_results() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_first_page(
        &mock_server,
        ResponseTemplate::new(200).set_body_string(results_page(1..=4, &[], 1, 4)),
    )
    .await;

    let out = dir.path().join("out");
    let mut config = Config::default();
    config.search.origin = mock_server.uri();
    config.output.scratch_dir = out.join("pages").display().to_string();
    config.output.output_dir = out.display().to_string();
    let context = Arc::new(SearchContext::new(config).unwrap());

    let summary = run_harvest(context).await.unwrap();

    assert!(summary.outputs.iter().all(|p| p.is_file()));
    assert!(!out.join("pages").exists());
}

/// Responds after a fixed delay and records when each request arrived
struct ArrivalLog {
    arrivals: Arc<Mutex<Vec<Instant>>>,
    delay: Duration,
}

impl Respond for ArrivalLog {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.arrivals.lock().unwrap().push(Instant::now());
        ResponseTemplate::new(200)
            .set_body_string("page")
            .set_delay(self.delay)
    }
}

#[tokio::test]
async fn test_pool_never_exceeds_worker_count() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let delay = Duration::from_millis(300);
    let arrivals = Arc::new(Mutex::new(Vec::new()));

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ArrivalLog {
            arrivals: Arc::clone(&arrivals),
            delay,
        })
        .mount(&mock_server)
        .await;

    let workers: u32 = 3;
    let context = create_test_context(&mock_server.uri(), dir.path(), workers);
    let fetcher = PageFetcher::new(Arc::clone(&context)).unwrap();
    let store = Arc::new(DiskPageStore::new(context.scratch_dir().clone()));
    let pool = FetchPool::new(fetcher, store, context.worker_count());

    let started = Instant::now();
    let report = pool.run(2..=13).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(report.stored.len(), 12);

    // Twelve pages over three workers take at least four delays
    assert!(elapsed >= delay * 4, "finished too fast: {:?}", elapsed);

    // A worker cannot issue its next request until the previous response
    // arrived, so any window shorter than the delay sees at most one
    // request per worker.
    let arrivals = arrivals.lock().unwrap().clone();
    assert_eq!(arrivals.len(), 12);
    let peak = arrivals
        .iter()
        .map(|&start| {
            arrivals
                .iter()
                .filter(|&&t| t >= start && t < start + delay / 2)
                .count()
        })
        .max()
        .unwrap();
    assert!(peak <= workers as usize, "{} requests in flight", peak);
    assert!(peak > 1, "requests were not issued concurrently");
}
