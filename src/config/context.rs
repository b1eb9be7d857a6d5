//! Immutable run context
//!
//! A `SearchContext` is built once from a validated [`Config`] and shared
//! (behind an `Arc`) by the fetcher, the worker pool, the page store and the
//! sinks. Nothing mutates it after construction.

use crate::config::types::Config;
use crate::config::validation::{parse_origin, validate};
use crate::ConfigError;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Process-wide search configuration
#[derive(Debug, Clone)]
pub struct SearchContext {
    query: String,
    origin: Url,
    search_url: Url,
    worker_count: usize,
    request_timeout: Duration,
    connect_timeout: Duration,
    user_agent: Option<String>,
    scratch_dir: PathBuf,
    output_dir: PathBuf,
    keep_scratch: bool,
}

impl SearchContext {
    /// Validates `config` and freezes it into a context
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        validate(&config)?;

        let origin = parse_origin(&config.search.origin)?;
        let search_url = build_search_url(&origin, &config.search.query, config.search.genre_id)?;

        Ok(Self {
            query: config.search.query,
            origin,
            search_url,
            worker_count: config.crawler.worker_count as usize,
            request_timeout: Duration::from_secs(config.crawler.request_timeout_secs),
            connect_timeout: Duration::from_secs(config.crawler.connect_timeout_secs),
            user_agent: config.crawler.user_agent,
            scratch_dir: PathBuf::from(config.output.scratch_dir),
            output_dir: PathBuf::from(config.output.output_dir),
            keep_scratch: config.output.keep_scratch,
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Site origin that relative book links are resolved against
    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// URL of the first results page (no `page` parameter)
    pub fn search_url(&self) -> &Url {
        &self.search_url
    }

    /// URL of results page `page` (1-based)
    pub fn page_url(&self, page: u32) -> Url {
        let mut url = self.search_url.clone();
        if page > 1 {
            url.query_pairs_mut()
                .append_pair("page", &page.to_string());
        }
        url
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Configured user agent override, if any
    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    pub fn scratch_dir(&self) -> &PathBuf {
        &self.scratch_dir
    }

    pub fn output_dir(&self) -> &PathBuf {
        &self.output_dir
    }

    pub fn keep_scratch(&self) -> bool {
        self.keep_scratch
    }
}

/// Builds `<origin>/search/<query>/?display=table&id_genre=<genre>`
fn build_search_url(origin: &Url, query: &str, genre_id: i32) -> Result<Url, ConfigError> {
    let mut url = origin.clone();
    url.set_query(None);
    url.set_fragment(None);

    url.path_segments_mut()
        .map_err(|_| ConfigError::InvalidUrl(format!("Origin '{}' cannot be a base", origin)))?
        .clear()
        .push("search")
        .push(query)
        .push("");

    url.query_pairs_mut()
        .append_pair("display", "table")
        .append_pair("id_genre", &genre_id.to_string());

    Ok(url)
}
