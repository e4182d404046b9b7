//! Crawler module for page fetching, discovery and scraping
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry and exponential backoff
//! - HTML extraction of books and listing links
//! - The bounded, cancellable discovery queue
//! - Discovery of listing pages with a worker pool
//! - The bounded scraping pipeline

mod discovery;
mod extractor;
mod fetcher;
mod pipeline;
mod queue;
mod retry;

pub use discovery::{DiscoveryConfig, DiscoveryEngine};
pub use extractor::{BookExtractor, PageExtractor};
pub use fetcher::{build_http_client, fetch_page, validate_html, HttpFetcher, PageFetcher};
pub use pipeline::Pipeline;
pub use queue::{QueueCancelled, UrlQueue};
pub use retry::{fetch_with_retry, RetryPolicy};
