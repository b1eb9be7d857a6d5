use serde::Deserialize;

/// Main configuration structure for Shelf-Harvest
///
/// Every table and key is optional; missing values fall back to the
/// defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// What to search for and where
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Search query, percent-encoded into the URL path
    pub query: String,

    /// Site origin, also used to resolve relative book links
    pub origin: String,

    /// Genre filter passed as `id_genre` (-1 means all genres)
    #[serde(rename = "genre-id")]
    pub genre_id: i32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            query: "java".to_string(),
            origin: "https://www.labirint.ru".to_string(),
            genre_id: -1,
        }
    }
}

/// Fetch behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Number of concurrent workers fetching pages 2..N
    #[serde(rename = "worker-count")]
    pub worker_count: u32,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Overrides the generated browser user agent
    #[serde(rename = "user-agent")]
    pub user_agent: Option<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            worker_count: 5,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory holding raw pages while a run is in progress
    #[serde(rename = "scratch-dir")]
    pub scratch_dir: String,

    /// Directory the timestamped JSON and CSV files are written to
    #[serde(rename = "output-dir")]
    pub output_dir: String,

    /// Leave the scratch directory in place after a successful run
    #[serde(rename = "keep-scratch")]
    pub keep_scratch: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            scratch_dir: "temp".to_string(),
            output_dir: ".".to_string(),
            keep_scratch: false,
        }
    }
}
