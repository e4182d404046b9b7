//! HTML extraction of books and listing links
//!
//! This module turns a catalogue listing page into:
//! - The books listed on it (one per `article.product_pod`)
//! - Links to other listing pages (hrefs containing `page-`)
//!
//! Extraction never fails: markup that does not match yields empty results.

use crate::model::Book;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Words used by the `star-rating` class, in rating order
const RATING_WORDS: [&str; 5] = ["One", "Two", "Three", "Four", "Five"];

/// Marker a link must contain to be a listing page
const LISTING_LINK_MARKER: &str = "page-";

/// Turns page content into books and outbound links
///
/// Implementations must be pure: the same input always gives the same output
/// and malformed input gives empty results.
pub trait PageExtractor: Send + Sync + 'static {
    /// Extracts every book listed on the page
    fn extract_books(&self, page_url: &str, html: &str) -> Vec<Book>;

    /// Extracts links to other listing pages, as absolute URLs
    fn extract_links(&self, page_url: &str, html: &str) -> Vec<String>;
}

/// Extractor for books.toscrape.com style catalogue pages
///
/// # Extraction Rules
///
/// For each `article.product_pod`:
/// - **title**: `title` attribute of `h3 a`, falling back to the link text
/// - **price**: text of `.price_color`, e.g. `£51.77`
/// - **star rating**: the word after `star-rating` in the class list
/// - **availability**: text of `.availability` with whitespace collapsed
/// - **image**: `img` `src`, resolved against the page URL
///
/// Books with an empty title are dropped.
///
/// # Example
///
/// ```
/// use shelf_scan::crawler::{BookExtractor, PageExtractor};
///
/// let html = r#"<html><body><article class="product_pod">
///   <p class="star-rating Three"></p>
///   <h3><a href="x/index.html" title="A Light in the Attic">A Light...</a></h3>
///   <p class="price_color">£51.77</p>
///   <p class="availability">In stock</p>
/// </article></body></html>"#;
///
/// let books = BookExtractor.extract_books("http://books.example.com/index.html", html);
/// assert_eq!(books[0].title, "A Light in the Attic");
/// assert_eq!(books[0].price, 51.77);
/// assert_eq!(books[0].star_rating, 3);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BookExtractor;

impl PageExtractor for BookExtractor {
    fn extract_books(&self, page_url: &str, html: &str) -> Vec<Book> {
        let document = Html::parse_document(html);
        let base_url = Url::parse(page_url).ok();

        let Ok(product_selector) = Selector::parse("article.product_pod") else {
            return Vec::new();
        };

        document
            .select(&product_selector)
            .filter_map(|product| extract_book(product, base_url.as_ref()))
            .collect()
    }

    fn extract_links(&self, page_url: &str, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let Ok(base_url) = Url::parse(page_url) else {
            return Vec::new();
        };
        let Ok(a_selector) = Selector::parse("a[href]") else {
            return Vec::new();
        };

        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for element in document.select(&a_selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            if !href.contains(LISTING_LINK_MARKER) {
                continue;
            }

            if let Some(absolute_url) = resolve_link(href, &base_url) {
                if seen.insert(absolute_url.clone()) {
                    links.push(absolute_url);
                }
            }
        }

        links
    }
}

/// Builds a book from one `product_pod` element
fn extract_book(product: ElementRef<'_>, base_url: Option<&Url>) -> Option<Book> {
    let title = select_first(product, "h3 a").map(|link| {
        link.value()
            .attr("title")
            .map(str::to_string)
            .unwrap_or_else(|| element_text(link))
    })?;
    let title = clean_text(&title);
    if title.is_empty() {
        return None;
    }

    let price = select_first(product, ".price_color")
        .map(|element| parse_price(&element_text(element)))
        .unwrap_or(0.0);

    let star_rating = select_first(product, ".star-rating")
        .map(|element| parse_star_rating(element.value().classes()))
        .unwrap_or(0);

    let availability = select_first(product, ".availability")
        .map(|element| clean_text(&element_text(element)))
        .unwrap_or_default();

    let image_url = select_first(product, "img")
        .and_then(|img| img.value().attr("src"))
        .map(|src| match base_url {
            Some(base) => resolve_link(src, base).unwrap_or_else(|| src.to_string()),
            None => src.to_string(),
        })
        .unwrap_or_default();

    Some(Book::new(title, price, star_rating, availability).with_image_url(image_url))
}

/// Returns the first descendant matching `selector`
fn select_first<'a>(element: ElementRef<'a>, selector: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(selector).ok()?;
    element.select(&selector).next()
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Collapses runs of whitespace into single spaces and trims the ends
fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses a displayed price such as `£51.77`
///
/// Only digits and the first decimal separator are kept; a `,` separator is
/// read as a decimal point. Unparsable prices are 0.
fn parse_price(text: &str) -> f64 {
    let mut number = String::new();
    let mut seen_separator = false;

    for c in text.chars() {
        if c.is_ascii_digit() {
            number.push(c);
        } else if (c == '.' || c == ',') && !seen_separator {
            number.push('.');
            seen_separator = true;
        }
    }

    number.parse().unwrap_or(0.0)
}

/// Maps a `star-rating` class list to a rating from 1 to 5, or 0 if unknown
fn parse_star_rating<'a>(classes: impl Iterator<Item = &'a str>) -> u8 {
    classes
        .filter_map(|class| RATING_WORDS.iter().position(|word| *word == class))
        .map(|index| index as u8 + 1)
        .next()
        .unwrap_or(0)
}

/// Resolves an href against the page URL, keeping only HTTP(S) results
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
