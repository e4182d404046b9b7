//! Aggregate statistics over the scraped books
//!
//! [`analyze`] runs a fixed set of independent parallel reductions over one
//! snapshot of the book collection and bundles them into an immutable
//! [`AnalysisResult`]. The result depends only on the books and their order,
//! never on thread scheduling.

mod metrics;

pub use metrics::{
    availability_histogram, average_price, average_rating, cheapest, five_star_count,
    in_stock_count, most_expensive, rating_histogram, total_price,
};

use crate::model::Book;
use serde::Serialize;
use std::collections::BTreeMap;

/// Aggregates computed from one snapshot of the collection
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Books rated five stars
    pub five_star_books: usize,

    /// Mean price over all books
    pub average_price: f64,

    /// Highest-priced book (earliest on a tie)
    pub most_expensive: Book,

    /// Lowest positive-priced book (earliest on a tie)
    pub cheapest: Book,

    /// Sum of all prices
    pub total_value: f64,

    /// Books whose availability reports them in stock
    pub books_in_stock: usize,

    /// Mean star rating over all books
    pub average_rating: f64,

    /// Books per availability text
    pub availability_stats: BTreeMap<String, usize>,

    /// Books per star rating
    pub rating_distribution: BTreeMap<u8, usize>,
}

/// Computes every aggregate over `books`
///
/// An empty slice gives zero numbers, empty maps and default books.
///
/// # Example
///
/// ```
/// use shelf_scan::{analyze, Book};
///
/// let books = vec![
///     Book::new("A", 10.0, 5, "In stock"),
///     Book::new("B", 20.0, 3, "In stock"),
///     Book::new("C", 5.0, 5, "Out of stock"),
/// ];
/// let result = analyze(&books);
///
/// assert_eq!(result.five_star_books, 2);
/// assert_eq!(result.total_value, 35.0);
/// assert_eq!(result.most_expensive.title, "B");
/// assert_eq!(result.cheapest.title, "C");
/// ```
pub fn analyze(books: &[Book]) -> AnalysisResult {
    tracing::debug!("Analyzing {} books", books.len());

    AnalysisResult {
        five_star_books: five_star_count(books),
        average_price: average_price(books),
        most_expensive: most_expensive(books),
        cheapest: cheapest(books),
        total_value: total_price(books),
        books_in_stock: in_stock_count(books),
        average_rating: average_rating(books),
        availability_stats: availability_histogram(books),
        rating_distribution: rating_histogram(books),
    }
}
