//! Three-stage scraping pipeline over a fixed list of URLs
//!
//! - **Stage A** (serial, in order): emits the next URL
//! - **Stage B** (concurrent): claims the URL in the visited set and fetches it
//! - **Stage C** (concurrent): extracts books and appends them to the session
//!
//! A semaphore holds the token budget. Stage A takes a permit before emitting
//! a URL and the permit is released only once stages B and C are done with it,
//! so at most `token_budget` items are alive at any time.

use crate::config::Config;
use crate::crawler::{fetch_with_retry, PageExtractor, PageFetcher, RetryPolicy};
use crate::state::Session;
use crate::url::normalize_key;
use crate::{Result, ScanError};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Fetches and parses a list of pages with bounded concurrency
pub struct Pipeline<F, E> {
    fetcher: Arc<F>,
    extractor: Arc<E>,
    token_budget: usize,
    retry: RetryPolicy,
}

impl<F, E> Pipeline<F, E>
where
    F: PageFetcher,
    E: PageExtractor,
{
    /// Creates a pipeline; a zero budget is raised to one
    pub fn new(
        fetcher: Arc<F>,
        extractor: Arc<E>,
        token_budget: usize,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            token_budget: token_budget.max(1),
            retry,
        }
    }

    pub fn from_config(fetcher: Arc<F>, extractor: Arc<E>, config: &Config) -> Self {
        Self::new(
            fetcher,
            extractor,
            config.crawler.token_budget(),
            config.crawler.retry_policy(),
        )
    }

    pub fn token_budget(&self) -> usize {
        self.token_budget
    }

    /// Runs every URL through the pipeline and waits for the full drain
    ///
    /// Run start and end times are recorded in the session's stats. Per-page
    /// failures are counted and logged; the only errors returned are a
    /// panicked stage task or a closed token budget.
    pub async fn run(&self, session: &Arc<Session>, urls: &[String]) -> Result<()> {
        let tokens = Arc::new(Semaphore::new(self.token_budget));
        let total = urls.len();
        let mut in_flight = JoinSet::new();

        session.stats().mark_started();
        tracing::info!(
            "Starting pipeline over {} URLs with {} tokens",
            total,
            self.token_budget
        );

        for (index, url) in urls.iter().enumerate() {
            let permit = Arc::clone(&tokens)
                .acquire_owned()
                .await
                .map_err(|e| ScanError::Pipeline(format!("token budget closed: {}", e)))?;

            // Reap finished items so panics surface early
            while let Some(done) = in_flight.try_join_next() {
                done?;
            }

            tracing::info!("Generating URL {}/{}: {}", index + 1, total, url);

            let item = PipelineItem {
                fetcher: Arc::clone(&self.fetcher),
                extractor: Arc::clone(&self.extractor),
                session: Arc::clone(session),
                retry: self.retry,
                url: url.clone(),
            };

            in_flight.spawn(async move {
                let _permit = permit;
                let content = item.fetch_stage().await;
                item.parse_stage(content);
            });
        }

        while let Some(done) = in_flight.join_next().await {
            done?;
        }

        session.stats().mark_finished();
        tracing::info!("Pipeline drained: {} URLs processed", total);
        Ok(())
    }
}

/// One URL travelling through stages B and C
struct PipelineItem<F, E> {
    fetcher: Arc<F>,
    extractor: Arc<E>,
    session: Arc<Session>,
    retry: RetryPolicy,
    url: String,
}

impl<F, E> PipelineItem<F, E>
where
    F: PageFetcher,
    E: PageExtractor,
{
    /// Stage B: returns the page content, or None if skipped or failed
    async fn fetch_stage(&self) -> Option<String> {
        let key = normalize_key(&self.url).unwrap_or_else(|_| self.url.clone());
        if !self.session.mark_visited(&key) {
            tracing::debug!("Already visited, skipping: {}", self.url);
            return None;
        }

        match fetch_with_retry(self.fetcher.as_ref(), &self.url, &self.retry).await {
            Ok(content) => {
                self.session.stats().record_page();
                Some(content)
            }
            Err(e) => {
                self.session.stats().record_failure();
                tracing::warn!("Failed to scrape {}: {}", self.url, e);
                None
            }
        }
    }

    /// Stage C: extracts books and stores them
    fn parse_stage(&self, content: Option<String>) {
        let Some(content) = content else {
            return;
        };

        let books = self.extractor.extract_books(&self.url, &content);
        let count = books.len();
        self.session.append_books(books);
        self.session.stats().record_books(count as u64);
        tracing::debug!("Extracted {} books from {}", count, self.url);
    }
}
