//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester, including:
//! - Building the HTTP client with a browser-like header set
//! - Bounded request and connect timeouts
//! - GET requests for numbered results pages
//! - Classifying failures as transport errors
//!
//! No request is ever retried; callers decide whether a failure is fatal.

use crate::config::SearchContext;
use crate::{ConfigError, HarvestError};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::Client;
use std::sync::Arc;

/// User agent sent when the configuration does not override it
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Builds the browser-like header set attached to every request
///
/// `Accept-Encoding` is left to the client, which negotiates gzip and brotli.
pub fn browser_headers(user_agent: Option<&str>) -> Result<HeaderMap, HarvestError> {
    let agent = user_agent.unwrap_or(DEFAULT_USER_AGENT);
    let agent = HeaderValue::from_str(agent)
        .map_err(|e| ConfigError::Validation(format!("invalid user agent '{}': {}", agent, e)))?;

    let mut headers = HeaderMap::new();
    headers.insert(header::USER_AGENT, agent);
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("ru-RU,ru;q=0.9,en-US;q=0.8,en;q=0.7"),
    );
    headers.insert(
        header::UPGRADE_INSECURE_REQUESTS,
        HeaderValue::from_static("1"),
    );
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    Ok(headers)
}

/// Builds an HTTP client configured from the search context
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(HarvestError)` - Invalid header value or client construction failure
pub fn build_http_client(context: &SearchContext) -> Result<Client, HarvestError> {
    let client = Client::builder()
        .default_headers(browser_headers(context.user_agent())?)
        .timeout(context.request_timeout())
        .connect_timeout(context.connect_timeout())
        .gzip(true)
        .brotli(true)
        .build()?;
    Ok(client)
}

/// Fetches results pages for one search
///
/// Cloning is cheap: the client and the context are both shared.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    context: Arc<SearchContext>,
}

impl PageFetcher {
    /// Creates a fetcher with a freshly built client
    pub fn new(context: Arc<SearchContext>) -> Result<Self, HarvestError> {
        let client = build_http_client(&context)?;
        Ok(Self { client, context })
    }

    pub fn context(&self) -> &SearchContext {
        &self.context
    }

    /// Fetches the markup of results page `page`
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - Page body, decoded as text
    /// * `Err(HarvestError::Transport)` - Network failure, timeout, or a
    ///   non-success status
    pub async fn fetch(&self, page: u32) -> Result<String, HarvestError> {
        let url = self.context.page_url(page);
        tracing::debug!("Fetching page {}: {}", page, url);

        let transport = |reason: String| HarvestError::Transport {
            page,
            url: url.to_string(),
            reason,
        };

        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => return Err(transport("request timeout".to_string())),
            Err(e) if e.is_connect() => return Err(transport(format!("connection failed: {}", e))),
            Err(e) => return Err(transport(e.to_string())),
        };

        let status = response.status();
        if !status.is_success() {
            return Err(transport(format!("HTTP {}", status.as_u16())));
        }

        response
            .text()
            .await
            .map_err(|e| transport(format!("failed to read body: {}", e)))
    }
}
