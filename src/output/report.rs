//! Plain-text analysis report
//!
//! The report lists run performance, the content analysis and the rating and
//! availability breakdowns. Prices are printed with two decimals and the
//! average rating with one.

use crate::analysis::AnalysisResult;
use crate::output::{with_suffix, write_file, OutputResult};
use crate::state::StatsSnapshot;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

const RULE: &str = "===============================================";

/// Writes the report to `<base>.txt` and returns the path written
pub fn write_report(
    base: &Path,
    analysis: &AnalysisResult,
    stats: &StatsSnapshot,
) -> OutputResult<PathBuf> {
    let path = with_suffix(base, "txt");
    write_file(&path, &format_report(analysis, stats))?;
    tracing::debug!("Wrote analysis report to {}", path.display());
    Ok(path)
}

/// Formats the analysis report
pub fn format_report(analysis: &AnalysisResult, stats: &StatsSnapshot) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = write_sections(&mut out, analysis, stats);
    out
}

fn write_sections(
    out: &mut String,
    analysis: &AnalysisResult,
    stats: &StatsSnapshot,
) -> std::fmt::Result {
    writeln!(out, "{}", RULE)?;
    writeln!(out, "        WEB SCRAPER - ANALYSIS RESULTS        ")?;
    writeln!(out, "{}", RULE)?;
    writeln!(out)?;

    writeln!(out, "PERFORMANCE STATS:")?;
    writeln!(out, "- Pages processed: {}", stats.pages_processed)?;
    writeln!(out, "- Books found: {}", stats.books_found)?;
    writeln!(out, "- Failed requests: {}", stats.failed_requests)?;
    writeln!(out, "- Execution time: {}", format_duration(stats.elapsed()))?;
    writeln!(out)?;

    writeln!(out, "CONTENT ANALYSIS:")?;
    writeln!(out, "1. Number of 5-star books: {}", analysis.five_star_books)?;
    writeln!(out, "2. Average book price: £{:.2}", analysis.average_price)?;
    writeln!(
        out,
        "3. Most expensive book: \"{}\" (£{:.2})",
        analysis.most_expensive.title, analysis.most_expensive.price
    )?;
    writeln!(
        out,
        "4. Cheapest book: \"{}\" (£{:.2})",
        analysis.cheapest.title, analysis.cheapest.price
    )?;
    writeln!(out, "5. Total value of all books: £{:.2}", analysis.total_value)?;
    writeln!(out)?;

    writeln!(out, "ADDITIONAL STATS:")?;
    writeln!(out, "- Average rating: {:.1}/5", analysis.average_rating)?;
    writeln!(out, "- Books in stock: {}", analysis.books_in_stock)?;
    writeln!(out)?;

    writeln!(out, "RATING DISTRIBUTION:")?;
    for (rating, count) in &analysis.rating_distribution {
        writeln!(out, "- {} star: {} books", rating, count)?;
    }
    writeln!(out)?;

    writeln!(out, "AVAILABILITY:")?;
    for (availability, count) in &analysis.availability_stats {
        writeln!(out, "- {}: {} books", availability, count)?;
    }

    writeln!(out)?;
    writeln!(out, "{}", RULE)
}

/// Formats a duration as seconds with millisecond precision, e.g. `3.042s`
pub fn format_duration(duration: Duration) -> String {
    format!("{}.{:03}s", duration.as_secs(), duration.subsec_millis())
}
