//! Individual parallel reductions over a book snapshot
//!
//! Every metric is an independent rayon pass with an associative combine.
//! Rayon keeps the left/right order of combined partitions, so tie-breaks that
//! keep the left operand always keep the earliest book.

use crate::model::Book;
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Books per partial sum when adding prices
///
/// Partial sums are computed per fixed chunk and then added in chunk order, so
/// float totals do not depend on how the work was scheduled.
const SUM_CHUNK: usize = 1024;

pub fn five_star_count(books: &[Book]) -> usize {
    books.par_iter().filter(|book| book.star_rating == 5).count()
}

pub fn in_stock_count(books: &[Book]) -> usize {
    books.par_iter().filter(|book| book.is_in_stock()).count()
}

/// Sum of all prices
pub fn total_price(books: &[Book]) -> f64 {
    books
        .par_chunks(SUM_CHUNK)
        .map(|chunk| chunk.iter().map(|book| book.price).sum::<f64>())
        .collect::<Vec<f64>>()
        .into_iter()
        .sum()
}

/// Mean price, 0 for no books
pub fn average_price(books: &[Book]) -> f64 {
    if books.is_empty() {
        return 0.0;
    }
    total_price(books) / books.len() as f64
}

/// Mean star rating, 0 for no books
pub fn average_rating(books: &[Book]) -> f64 {
    if books.is_empty() {
        return 0.0;
    }
    let total: u64 = books.par_iter().map(|book| u64::from(book.star_rating)).sum();
    total as f64 / books.len() as f64
}

/// The highest-priced book; on a tie the earliest one wins
///
/// Returns `Book::default()` for no books.
pub fn most_expensive(books: &[Book]) -> Book {
    books
        .par_iter()
        .reduce_with(|a, b| if a.price >= b.price { a } else { b })
        .cloned()
        .unwrap_or_default()
}

/// The lowest-priced book among those with a positive price
///
/// On a tie the earliest one wins. Returns `Book::default()` when no book has
/// a positive price.
pub fn cheapest(books: &[Book]) -> Book {
    books
        .par_iter()
        .filter(|book| book.price > 0.0)
        .reduce_with(|a, b| if a.price <= b.price { a } else { b })
        .cloned()
        .unwrap_or_default()
}

/// Count of books per non-empty availability text
pub fn availability_histogram(books: &[Book]) -> BTreeMap<String, usize> {
    books
        .par_iter()
        .filter(|book| !book.availability.is_empty())
        .fold(BTreeMap::new, |mut counts, book| {
            *counts.entry(book.availability.clone()).or_insert(0) += 1;
            counts
        })
        .reduce(BTreeMap::new, merge_counts)
}

/// Count of books per star rating
pub fn rating_histogram(books: &[Book]) -> BTreeMap<u8, usize> {
    books
        .par_iter()
        .fold(BTreeMap::new, |mut counts, book| {
            *counts.entry(book.star_rating).or_insert(0) += 1;
            counts
        })
        .reduce(BTreeMap::new, merge_counts)
}

fn merge_counts<K: Ord>(
    mut left: BTreeMap<K, usize>,
    right: BTreeMap<K, usize>,
) -> BTreeMap<K, usize> {
    for (key, count) in right {
        *left.entry(key).or_insert(0) += count;
    }
    left
}
