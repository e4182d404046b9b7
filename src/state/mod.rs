//! State module for tracking a scraping session
//!
//! # Components
//!
//! - `Session`: the concurrent store shared by discovery and the pipeline
//!   (book collection, visited and discovered URL sets, run counters)
//! - `RunStats`: atomic counters and timestamps for a run
//! - `StatsSnapshot`: an immutable copy of the counters for reporting

mod run_stats;
mod session;

// Re-export main types
pub use run_stats::{RunStats, StatsSnapshot};
pub use session::Session;
