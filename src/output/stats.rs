//! Run statistics display
//!
//! Prints the counters of a finished scraping run together with its
//! throughput.

use crate::state::StatsSnapshot;

/// Formats run statistics for display
///
/// Throughput lines are omitted when the run took no measurable time.
pub fn format_run_statistics(stats: &StatsSnapshot, unique_urls: usize) -> String {
    let mut lines = vec![
        "=== PERFORMANCE STATS ===".to_string(),
        format!("Pages processed: {}", stats.pages_processed),
        format!("Books found: {}", stats.books_found),
        format!("Failed requests: {}", stats.failed_requests),
        format!("Total time: {} ms", stats.elapsed().as_millis()),
    ];

    if let (Some(pages), Some(books)) = (stats.pages_per_second(), stats.books_per_second()) {
        lines.push(format!("Speed: {:.2} pages/s, {:.2} books/s", pages, books));
    }

    lines.push(format!("Unique URLs: {}", unique_urls));
    lines.push("================================".to_string());
    lines.join("\n")
}

/// Prints run statistics to stdout
///
/// # Arguments
///
/// * `stats` - Counters and timestamps of the run
/// * `unique_urls` - Number of distinct URLs the pipeline visited
pub fn print_run_statistics(stats: &StatsSnapshot, unique_urls: usize) {
    println!();
    println!("{}", format_run_statistics(stats, unique_urls));
    println!();
}
