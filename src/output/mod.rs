//! Output module for persisting and displaying scan results
//!
//! This module handles:
//! - Writing the plain-text analysis report (`<base>.txt`)
//! - Writing the scraped books as JSON (`<base>.json`)
//! - Printing run statistics to stdout

mod json;
mod report;
pub mod stats;

pub use json::write_books_json;
pub use report::{format_duration, format_report, write_report};
pub use stats::{format_run_statistics, print_run_statistics};

use crate::analysis::AnalysisResult;
use crate::model::Book;
use crate::state::StatsSnapshot;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize books: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Paths of the files written by [`save_results`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedResults {
    pub report: PathBuf,
    pub books: PathBuf,
}

/// Writes the analysis report and the raw book data
///
/// `base` is extended with `.txt` for the report and `.json` for the books,
/// so `results` produces `results.txt` and `results.json`.
///
/// # Returns
///
/// * `Ok(SavedResults)` - Both files were written
/// * `Err(OutputError)` - A file could not be written or serialized
pub fn save_results(
    base: &Path,
    analysis: &AnalysisResult,
    stats: &StatsSnapshot,
    books: &[Book],
) -> OutputResult<SavedResults> {
    let report = write_report(base, analysis, stats)?;
    let books = write_books_json(base, books)?;

    tracing::info!(
        "Results saved to {} and {}",
        report.display(),
        books.display()
    );

    Ok(SavedResults { report, books })
}

/// Appends `.{extension}` to a path without replacing an existing extension
pub(crate) fn with_suffix(base: &Path, extension: &str) -> PathBuf {
    let mut path = OsString::from(base.as_os_str());
    path.push(".");
    path.push(extension);
    PathBuf::from(path)
}

/// Writes `content` to `path`, attaching the path to any I/O error
pub(crate) fn write_file(path: &Path, content: &str) -> OutputResult<()> {
    std::fs::write(path, content).map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })
}
