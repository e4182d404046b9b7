//! JSON export of the scraped books

use crate::model::Book;
use crate::output::{with_suffix, write_file, OutputResult};
use std::path::{Path, PathBuf};

/// Writes `books` to `<base>.json` as a pretty-printed array
///
/// Books keep their collection order. Each object has the fields `title`,
/// `price`, `starRating`, `availability` and `imageUrl`.
pub fn write_books_json(base: &Path, books: &[Book]) -> OutputResult<PathBuf> {
    let path = with_suffix(base, "json");
    let mut content = serde_json::to_string_pretty(books)?;
    content.push('\n');

    write_file(&path, &content)?;
    tracing::debug!("Wrote {} books to {}", books.len(), path.display());
    Ok(path)
}
