//! Discovery engine - breadth-first exploration of the catalogue's listing pages
//!
//! A fixed pool of worker tasks shares one bounded [`UrlQueue`]. Each worker:
//! 1. Pops the next URL (exits on cancellation)
//! 2. Claims it in the session's discovered set (skips it if already claimed)
//! 3. Counts it against the page cap
//! 4. Fetches it with retry and pushes every accepted, unseen link
//! 5. Aborts the queue once the cap is reached
//!
//! The cap is soft: workers that claimed a URL before the abort still process
//! it, so at most `workers - 1` pages beyond the cap are fetched.

use crate::config::Config;
use crate::crawler::{fetch_with_retry, PageExtractor, PageFetcher, RetryPolicy, UrlQueue};
use crate::state::Session;
use crate::url::{is_index_url, normalize_url, SiteFilter};
use crate::{Result, ScanError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Settings for one discovery run
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Where exploration starts
    pub seed_url: String,

    /// Number of pages to process before cancelling
    pub max_pages: usize,

    /// Number of concurrent workers
    pub workers: usize,

    /// Maximum number of pending URLs
    pub queue_capacity: usize,

    pub retry: RetryPolicy,

    /// Path fragment identifying listing pages
    pub page_pattern: String,
}

impl DiscoveryConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            seed_url: config.crawler.seed_url.clone(),
            max_pages: config.crawler.max_pages,
            workers: config.crawler.worker_count(),
            queue_capacity: config.crawler.queue_capacity,
            retry: config.crawler.retry_policy(),
            page_pattern: config.crawler.page_pattern.clone(),
        }
    }
}

/// Explores the site from the seed URL with a pool of workers
pub struct DiscoveryEngine<F, E> {
    fetcher: Arc<F>,
    extractor: Arc<E>,
    config: DiscoveryConfig,
}

impl<F, E> DiscoveryEngine<F, E>
where
    F: PageFetcher,
    E: PageExtractor,
{
    pub fn new(fetcher: Arc<F>, extractor: Arc<E>, config: DiscoveryConfig) -> Self {
        Self {
            fetcher,
            extractor,
            config,
        }
    }

    /// Runs discovery to completion and returns the listing pages found
    ///
    /// Every worker is joined before the discovered set is read. The result
    /// excludes the seed and index pages, is deduplicated, and is sorted.
    ///
    /// # Errors
    ///
    /// Fails if the seed URL is invalid or a worker task panics. Per-page fetch
    /// failures are logged and skipped.
    pub async fn discover(&self, session: &Arc<Session>) -> Result<Vec<String>> {
        let seed = normalize_url(&self.config.seed_url)?;
        let filter = SiteFilter::for_seed(&seed, &self.config.page_pattern)?;
        let workers = self.config.workers.max(1);
        let queue = Arc::new(UrlQueue::new(self.config.queue_capacity, workers));

        tracing::info!(
            "Starting discovery from {} with {} workers (cap {} pages)",
            seed,
            workers,
            self.config.max_pages
        );

        queue
            .push(seed.to_string())
            .await
            .map_err(|e| ScanError::Discovery(format!("failed to seed queue: {}", e)))?;

        let shared = Arc::new(WorkerShared {
            fetcher: Arc::clone(&self.fetcher),
            extractor: Arc::clone(&self.extractor),
            session: Arc::clone(session),
            queue,
            filter,
            processed: AtomicUsize::new(0),
            max_pages: self.config.max_pages.max(1),
            retry: self.config.retry,
        });

        let mut tasks = JoinSet::new();
        for id in 0..workers {
            tasks.spawn(Arc::clone(&shared).run_worker(id));
        }

        while let Some(joined) = tasks.join_next().await {
            joined?;
        }

        let seed = seed.to_string();
        let mut urls: Vec<String> = session
            .discovered_urls()
            .into_iter()
            .filter(|url| !is_index_url(url, &seed))
            .collect();
        urls.sort();
        urls.dedup();

        tracing::info!(
            "Discovery finished: {} pages processed, {} listing pages found",
            shared.processed.load(Ordering::SeqCst),
            urls.len()
        );

        Ok(urls)
    }
}

/// State shared by every discovery worker
struct WorkerShared<F, E> {
    fetcher: Arc<F>,
    extractor: Arc<E>,
    session: Arc<Session>,
    queue: Arc<UrlQueue>,
    filter: SiteFilter,
    processed: AtomicUsize,
    max_pages: usize,
    retry: RetryPolicy,
}

impl<F, E> WorkerShared<F, E>
where
    F: PageFetcher,
    E: PageExtractor,
{
    async fn run_worker(self: Arc<Self>, id: usize) {
        while let Ok(url) = self.queue.pop().await {
            if !self.session.mark_discovered(&url) {
                tracing::debug!("[worker {}] Already discovered: {}", id, url);
                continue;
            }

            let n = self.processed.fetch_add(1, Ordering::SeqCst) + 1;
            tracing::info!("[worker {}] Discovering page {}: {}", id, n, url);

            match fetch_with_retry(self.fetcher.as_ref(), &url, &self.retry).await {
                Ok(html) => {
                    if !self.enqueue_links(&url, &html).await {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!("[worker {}] Failed to discover {}: {}", id, url, e);
                }
            }

            if n >= self.max_pages {
                if self.queue.abort() {
                    tracing::info!("Discovery cap of {} pages reached", self.max_pages);
                }
                break;
            }
        }

        tracing::debug!("[worker {}] Exiting", id);
    }

    /// Pushes every accepted, undiscovered link on the page
    ///
    /// Returns false if the queue was cancelled meanwhile.
    async fn enqueue_links(&self, page_url: &str, html: &str) -> bool {
        let links = self.extractor.extract_links(page_url, html);

        for link in links {
            let normalized = match normalize_url(&link) {
                Ok(url) => url,
                Err(e) => {
                    tracing::debug!("Skipping link {}: {}", link, e);
                    continue;
                }
            };

            if !self.filter.accepts(&normalized) {
                continue;
            }

            let normalized = normalized.to_string();
            if self.session.is_discovered(&normalized) {
                continue;
            }

            if self.queue.push(normalized).await.is_err() {
                return false;
            }
        }

        true
    }
}
