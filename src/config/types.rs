use crate::crawler::RetryPolicy;
use serde::Deserialize;
use std::num::NonZeroUsize;
use std::time::Duration;

pub const DEFAULT_SEED_URL: &str = "http://books.toscrape.com/index.html";
pub const DEFAULT_MAX_PAGES: usize = 50;
pub const DEFAULT_MAX_FETCH_RETRIES: u32 = 3;
pub const DEFAULT_PAGE_PATTERN: &str = "catalogue/page-";

/// Main configuration structure for ShelfScan
///
/// Every table and key is optional; a missing file yields `Config::default()`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Discovery and pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Page discovery starts from this URL
    #[serde(rename = "seed-url", default = "default_seed_url")]
    pub seed_url: String,

    /// Discovery stops once this many pages have been processed
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: usize,

    /// Attempts per page fetch, including the first one
    #[serde(rename = "max-fetch-retries", default = "default_max_fetch_retries")]
    pub max_fetch_retries: u32,

    /// Base of the exponential backoff (milliseconds); the wait after attempt
    /// `n` is `base * 2^n`
    #[serde(rename = "backoff-base-ms", default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Maximum number of pages in flight through the pipeline
    #[serde(rename = "pipeline-token-budget", default)]
    pub pipeline_token_budget: Option<usize>,

    /// Number of concurrent discovery workers
    #[serde(rename = "discovery-worker-count", default)]
    pub discovery_worker_count: Option<usize>,

    /// Capacity of the discovery frontier queue
    #[serde(rename = "queue-capacity", default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Path fragment identifying catalogue listing pages
    #[serde(rename = "page-pattern", default = "default_page_pattern")]
    pub page_pattern: String,
}

impl CrawlerConfig {
    /// Pipeline token budget, defaulting to `max(2, 2 * parallelism)`
    pub fn token_budget(&self) -> usize {
        self.pipeline_token_budget
            .unwrap_or_else(|| (2 * available_parallelism()).max(2))
    }

    /// Discovery worker count, defaulting to `max(1, parallelism)`
    pub fn worker_count(&self) -> usize {
        self.discovery_worker_count
            .unwrap_or_else(|| available_parallelism().max(1))
    }

    /// Retry policy for page fetches
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_fetch_retries,
            Duration::from_millis(self.backoff_base_ms),
        )
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            seed_url: default_seed_url(),
            max_pages: default_max_pages(),
            max_fetch_retries: default_max_fetch_retries(),
            backoff_base_ms: default_backoff_base_ms(),
            pipeline_token_budget: None,
            discovery_worker_count: None,
            queue_capacity: default_queue_capacity(),
            page_pattern: default_page_pattern(),
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Maximum redirect hops followed per request
    #[serde(rename = "max-redirects", default = "default_max_redirects")]
    pub max_redirects: usize,

    /// User-Agent header value
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

impl HttpConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
            max_redirects: default_max_redirects(),
            user_agent: default_user_agent(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Base path for result files; `.txt` and `.json` are appended
    #[serde(rename = "results-path", default = "default_results_path")]
    pub results_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_path: default_results_path(),
        }
    }
}

/// Hardware parallelism, 1 when it cannot be determined
pub fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

fn default_seed_url() -> String {
    DEFAULT_SEED_URL.to_string()
}

fn default_max_pages() -> usize {
    DEFAULT_MAX_PAGES
}

fn default_max_fetch_retries() -> u32 {
    DEFAULT_MAX_FETCH_RETRIES
}

fn default_backoff_base_ms() -> u64 {
    1000
}

fn default_queue_capacity() -> usize {
    4096
}

fn default_page_pattern() -> String {
    DEFAULT_PAGE_PATTERN.to_string()
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_request_timeout() -> u64 {
    10
}

fn default_max_redirects() -> usize {
    10
}

fn default_user_agent() -> String {
    format!("ShelfScan/{}", env!("CARGO_PKG_VERSION"))
}

fn default_results_path() -> String {
    "results".to_string()
}
