use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Counters describing a scraping run
///
/// The counters are only ever incremented while a run is in progress. They go
/// back to zero through [`crate::Session::reset`] and nothing else.
#[derive(Debug, Default)]
pub struct RunStats {
    pages_processed: AtomicU64,
    books_found: AtomicU64,
    failed_requests: AtomicU64,
    started_at: Mutex<Option<DateTime<Utc>>>,
    finished_at: Mutex<Option<DateTime<Utc>>>,
}

impl RunStats {
    /// Creates zeroed run statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one successfully fetched page
    pub fn record_page(&self) {
        self.pages_processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a page whose fetch failed after all retries
    pub fn record_failure(&self) {
        self.failed_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Records `count` books stored from a page
    pub fn record_books(&self, count: u64) {
        self.books_found.fetch_add(count, Ordering::Relaxed);
    }

    /// Stamps the start of a run
    pub fn mark_started(&self) {
        *self.started_at.lock() = Some(Utc::now());
        *self.finished_at.lock() = None;
    }

    /// Stamps the end of a run
    pub fn mark_finished(&self) {
        *self.finished_at.lock() = Some(Utc::now());
    }

    pub fn pages_processed(&self) -> u64 {
        self.pages_processed.load(Ordering::Relaxed)
    }

    pub fn books_found(&self) -> u64 {
        self.books_found.load(Ordering::Relaxed)
    }

    pub fn failed_requests(&self) -> u64 {
        self.failed_requests.load(Ordering::Relaxed)
    }

    /// Takes a point-in-time copy of the counters and timestamps
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            pages_processed: self.pages_processed(),
            books_found: self.books_found(),
            failed_requests: self.failed_requests(),
            started_at: *self.started_at.lock(),
            finished_at: *self.finished_at.lock(),
        }
    }

    pub(crate) fn reset(&self) {
        self.pages_processed.store(0, Ordering::Relaxed);
        self.books_found.store(0, Ordering::Relaxed);
        self.failed_requests.store(0, Ordering::Relaxed);
        *self.started_at.lock() = None;
        *self.finished_at.lock() = None;
    }
}

/// Immutable copy of [`RunStats`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatsSnapshot {
    pub pages_processed: u64,
    pub books_found: u64,
    pub failed_requests: u64,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl StatsSnapshot {
    /// Wall-clock duration of the run, zero if it never started or finished
    pub fn elapsed(&self) -> Duration {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => (end - start).to_std().unwrap_or(Duration::ZERO),
            _ => Duration::ZERO,
        }
    }

    /// Pages fetched per second over the run
    pub fn pages_per_second(&self) -> Option<f64> {
        rate(self.pages_processed, self.elapsed())
    }

    /// Books stored per second over the run
    pub fn books_per_second(&self) -> Option<f64> {
        rate(self.books_found, self.elapsed())
    }
}

fn rate(count: u64, elapsed: Duration) -> Option<f64> {
    let millis = elapsed.as_millis();
    if millis == 0 {
        None
    } else {
        Some(count as f64 * 1000.0 / millis as f64)
    }
}
