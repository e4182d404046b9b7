//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the scanner, including:
//! - Building HTTP clients with timeouts and a bounded redirect policy
//! - GET requests to fetch page content
//! - Error classification (connect, timeout, HTTP status)
//! - Heuristic validation that the body is a real HTML page

use crate::config::HttpConfig;
use crate::FetchError;
use reqwest::{redirect::Policy, Client};
use std::future::Future;

/// Markers of which at least one must appear in a valid page
const HTML_MARKERS: &[&str] = &["<!DOCTYPE html>", "<html"];

/// Fragments that identify an error page served with a success status
const ERROR_PAGE_FRAGMENTS: &[&str] = &["404 Not Found", "500 Internal Server Error", "403 Forbidden"];

/// Something that can fetch the content of a page
///
/// Implemented by [`HttpFetcher`] for real requests; tests substitute
/// in-memory fetchers.
pub trait PageFetcher: Send + Sync + 'static {
    /// Fetches one page, returning its body
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Fetches pages over HTTP with reqwest
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a fetcher with a client configured from `config`
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    /// Wraps an already configured client
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        fetch_page(&self.client, url).await
    }
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are followed up to `max_redirects` hops; the connect and total
/// request timeouts come from the config.
///
/// # Example
///
/// ```no_run
/// use shelf_scan::config::HttpConfig;
/// use shelf_scan::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.request_timeout())
        .connect_timeout(config.connect_timeout())
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and validates the response
///
/// # Request Flow
///
/// 1. Send GET request (redirects followed by the client)
/// 2. Any status >= 400 fails with `HttpStatus`
/// 3. Read the body
/// 4. Validate the body looks like an HTML page
///
/// | Condition | Result |
/// |-----------|--------|
/// | Connection refused / DNS failure | `Connect` |
/// | Connect or total timeout | `Timeout` |
/// | Too many redirects, body read failure | `Network` |
/// | HTTP status >= 400 | `HttpStatus` |
/// | Body is not plausible HTML | `InvalidContent` |
pub async fn fetch_page(client: &Client, url: &str) -> Result<String, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;

    let status = response.status();
    if status.as_u16() >= 400 {
        return Err(FetchError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(|e| classify_error(url, e))?;

    validate_html(url, &body)?;
    Ok(body)
}

/// Checks that a response body is a plausible HTML page
///
/// The body must be non-empty, contain an HTML document marker, and must not
/// contain a known error-page fragment.
pub fn validate_html(url: &str, body: &str) -> Result<(), FetchError> {
    let invalid = |reason: &str| FetchError::InvalidContent {
        url: url.to_string(),
        reason: reason.to_string(),
    };

    if body.is_empty() {
        return Err(invalid("empty body"));
    }

    if !HTML_MARKERS.iter().any(|marker| body.contains(marker)) {
        return Err(invalid("no HTML document marker"));
    }

    if let Some(fragment) = ERROR_PAGE_FRAGMENTS
        .iter()
        .find(|fragment| body.contains(*fragment))
    {
        return Err(invalid(&format!("error page ({})", fragment)));
    }

    Ok(())
}

/// Maps a reqwest error onto the fetch error taxonomy
fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Connect {
            url: url.to_string(),
            message: error.to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
