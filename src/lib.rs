//! ShelfScan: a concurrent catalogue scraper
//!
//! This crate discovers the paginated listing pages of a product catalogue site,
//! fetches and parses them through a bounded pipeline, and computes deterministic
//! aggregate statistics over the extracted books.

pub mod analysis;
pub mod config;
pub mod crawler;
pub mod model;
pub mod output;
pub mod scanner;
pub mod state;
pub mod url;

#[cfg(test)]
pub(crate) mod test_support;

use thiserror::Error;

/// Main error type for ShelfScan operations
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to initialize HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    #[error("Discovery error: {0}")]
    Discovery(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

/// Errors produced by a single page fetch
///
/// Every variant is retried identically by [`crawler::fetch_with_retry`];
/// `RetriesExhausted` is what callers see once the attempt budget is spent.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("HTTP error {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Invalid content received from {url}: {reason}")]
    InvalidContent { url: String, reason: String },

    #[error("All {attempts} fetch attempts failed for {url}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },
}

impl FetchError {
    /// The URL this error refers to
    pub fn url(&self) -> &str {
        match self {
            Self::Connect { url, .. }
            | Self::Timeout { url }
            | Self::Network { url, .. }
            | Self::HttpStatus { url, .. }
            | Self::InvalidContent { url, .. }
            | Self::RetriesExhausted { url, .. } => url,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for ShelfScan operations
pub type Result<T> = std::result::Result<T, ScanError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use analysis::{analyze, AnalysisResult};
pub use config::Config;
pub use model::Book;
pub use scanner::ShelfScan;
pub use state::{RunStats, Session, StatsSnapshot};
