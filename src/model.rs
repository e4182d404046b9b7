//! Catalogue record types

use serde::{Deserialize, Serialize};

/// One book listed on a catalogue page
///
/// Books are immutable once extracted. The serialized field names
/// (`title`, `price`, `starRating`, `availability`, `imageUrl`) are the
/// stable format of the JSON results file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Book title
    pub title: String,

    /// Listed price, currency-agnostic magnitude
    pub price: f64,

    /// Star rating from 1 to 5, or 0 when unknown
    pub star_rating: u8,

    /// Availability text as shown on the page (e.g. "In stock")
    pub availability: String,

    /// Absolute URL of the cover image
    pub image_url: String,
}

impl Book {
    /// Creates a book without an image URL
    pub fn new(
        title: impl Into<String>,
        price: f64,
        star_rating: u8,
        availability: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            price,
            star_rating,
            availability: availability.into(),
            image_url: String::new(),
        }
    }

    /// Returns a copy of this book with the given image URL
    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = image_url.into();
        self
    }

    /// Returns true if the availability text reports the book as in stock
    pub fn is_in_stock(&self) -> bool {
        self.availability.to_lowercase().contains("in stock")
    }
}
