use crate::model::Book;
use crate::state::{RunStats, StatsSnapshot};
use dashmap::DashSet;
use parking_lot::RwLock;

/// Concurrent state shared by every stage of a scraping session
///
/// Each piece of state has its own synchronization: the URL sets are sharded
/// concurrent sets, the counters are atomics and the book collection sits behind
/// its own lock. No operation takes more than one of them at a time.
#[derive(Debug, Default)]
pub struct Session {
    books: RwLock<Vec<Book>>,
    visited: DashSet<String>,
    discovered: DashSet<String>,
    stats: RunStats,
}

impl Session {
    /// Creates an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a URL as visited by the pipeline
    ///
    /// Returns `true` if the URL was not visited before. The check and the insert
    /// are one atomic operation, so exactly one caller wins for a given URL.
    pub fn mark_visited(&self, url: &str) -> bool {
        self.visited.insert(url.to_string())
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Marks a URL as discovered; same atomicity as [`Session::mark_visited`]
    pub fn mark_discovered(&self, url: &str) -> bool {
        self.discovered.insert(url.to_string())
    }

    pub fn is_discovered(&self, url: &str) -> bool {
        self.discovered.contains(url)
    }

    pub fn discovered_count(&self) -> usize {
        self.discovered.len()
    }

    /// Copies out the discovered URLs in unspecified order
    pub fn discovered_urls(&self) -> Vec<String> {
        self.discovered.iter().map(|url| url.key().clone()).collect()
    }

    /// Appends books to the collection, returning how many were added
    ///
    /// The batch becomes visible to readers all at once.
    pub fn append_books(&self, books: Vec<Book>) -> usize {
        let count = books.len();
        if count > 0 {
            self.books.write().extend(books);
        }
        count
    }

    pub fn book_count(&self) -> usize {
        self.books.read().len()
    }

    /// Copies the book collection as it is at this instant
    pub fn snapshot_books(&self) -> Vec<Book> {
        self.books.read().clone()
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn stats_snapshot(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Clears the URL sets, the book collection and the run counters
    pub fn reset(&self) {
        self.books.write().clear();
        self.visited.clear();
        self.discovered.clear();
        self.stats.reset();
    }
}
