//! Scanner facade - one object driving a complete scan
//!
//! [`ShelfScan`] owns the configuration, the fetcher, the extractor and the
//! session, and exposes the phases of a scan:
//! 1. `discover` - find the catalogue's listing pages
//! 2. `scrape` - run the pipeline over them
//! 3. `analyze` - aggregate the scraped books
//! 4. `save_results` - write the report and the JSON data

use crate::analysis::{analyze, AnalysisResult};
use crate::config::Config;
use crate::crawler::{
    BookExtractor, DiscoveryConfig, DiscoveryEngine, HttpFetcher, PageExtractor, PageFetcher,
    Pipeline,
};
use crate::output::{print_run_statistics, save_results, SavedResults};
use crate::state::Session;
use crate::Result;
use std::path::Path;
use std::sync::Arc;

/// A catalogue scan with its own session state
///
/// # Example
///
/// ```no_run
/// use shelf_scan::{Config, ShelfScan};
///
/// # async fn example() -> shelf_scan::Result<()> {
/// let scan = ShelfScan::new(Config::default())?;
/// let urls = scan.discover().await?;
/// scan.scrape(&urls).await?;
/// let analysis = scan.analyze().await?;
/// scan.save_results(&analysis)?;
/// # Ok(())
/// # }
/// ```
pub struct ShelfScan<F = HttpFetcher, E = BookExtractor> {
    config: Config,
    fetcher: Arc<F>,
    extractor: Arc<E>,
    session: Arc<Session>,
}

impl ShelfScan {
    /// Creates a scanner that fetches over HTTP
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.http)?;
        Ok(Self::with_parts(config, fetcher, BookExtractor))
    }
}

impl<F, E> ShelfScan<F, E>
where
    F: PageFetcher,
    E: PageExtractor,
{
    /// Creates a scanner with a custom fetcher and extractor
    pub fn with_parts(config: Config, fetcher: F, extractor: E) -> Self {
        Self {
            config,
            fetcher: Arc::new(fetcher),
            extractor: Arc::new(extractor),
            session: Arc::new(Session::new()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Discovers listing pages from the configured seed URL
    pub async fn discover(&self) -> Result<Vec<String>> {
        let engine = DiscoveryEngine::new(
            Arc::clone(&self.fetcher),
            Arc::clone(&self.extractor),
            DiscoveryConfig::from_config(&self.config),
        );
        engine.discover(&self.session).await
    }

    /// Fetches and parses `urls`, storing the books in the session
    pub async fn scrape(&self, urls: &[String]) -> Result<()> {
        let pipeline = Pipeline::from_config(
            Arc::clone(&self.fetcher),
            Arc::clone(&self.extractor),
            &self.config,
        );
        pipeline.run(&self.session, urls).await
    }

    /// Analyzes a snapshot of the books scraped so far
    ///
    /// The reductions run on a blocking thread so they do not stall the
    /// async runtime.
    pub async fn analyze(&self) -> Result<AnalysisResult> {
        let books = self.session.snapshot_books();
        let result = tokio::task::spawn_blocking(move || analyze(&books)).await?;
        Ok(result)
    }

    /// Prints the run counters and throughput to stdout
    pub fn print_statistics(&self) {
        print_run_statistics(&self.session.stats_snapshot(), self.session.visited_count());
    }

    /// Writes the report and the book data under the configured results path
    pub fn save_results(&self, analysis: &AnalysisResult) -> Result<SavedResults> {
        let base = Path::new(&self.config.output.results_path);
        let saved = save_results(
            base,
            analysis,
            &self.session.stats_snapshot(),
            &self.session.snapshot_books(),
        )?;
        Ok(saved)
    }

    /// Clears all session state, as if the scanner were new
    pub fn reset(&self) {
        self.session.reset();
        tracing::debug!("Session state reset");
    }
}
