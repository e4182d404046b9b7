//! In-memory fetchers and page builders shared by unit tests

use crate::crawler::PageFetcher;
use crate::FetchError;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// Fails the first `failures` calls with a connect error, then serves `body`
pub struct FlakyFetcher {
    failures: usize,
    body: String,
    calls: Mutex<Vec<Instant>>,
}

impl FlakyFetcher {
    pub fn new(failures: usize, body: &str) -> Self {
        Self {
            failures,
            body: body.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().clone()
    }
}

impl PageFetcher for FlakyFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let call = {
            let mut calls = self.calls.lock();
            calls.push(Instant::now());
            calls.len()
        };

        if call <= self.failures {
            Err(FetchError::Connect {
                url: url.to_string(),
                message: "connection refused".to_string(),
            })
        } else {
            Ok(self.body.clone())
        }
    }
}

/// Serves a fixed set of pages keyed by URL and records every request
#[derive(Default)]
pub struct SiteFetcher {
    pages: HashMap<String, String>,
    failing: HashSet<String>,
    delay: Option<Duration>,
    calls: Mutex<HashMap<String, usize>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl SiteFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), html.into());
        self
    }

    pub fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    /// Every fetch sleeps this long before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls_for(&self, url: &str) -> usize {
        self.calls.lock().get(url).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }

    pub fn distinct_urls_fetched(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl PageFetcher for SiteFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        *self.calls.lock().entry(url.to_string()).or_insert(0) += 1;

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(url) {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: 500,
            });
        }

        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::HttpStatus {
                url: url.to_string(),
                status: 404,
            })
    }
}

/// A listing entry: title, price text, rating word, availability
pub type Listing<'a> = (&'a str, &'a str, &'a str, &'a str);

/// Builds a catalogue listing page with the given links and books
pub fn catalogue_page(links: &[&str], books: &[Listing<'_>]) -> String {
    let mut html = String::from("<!DOCTYPE html>\n<html><head><title>All products</title></head><body><ol class=\"row\">\n");

    for (title, price, rating, availability) in books {
        html.push_str(&format!(
            r#"<li><article class="product_pod">
  <div class="image_container"><a href="a-book/index.html"><img src="../media/cache/{slug}.jpg" alt="{title}" class="thumbnail"></a></div>
  <p class="star-rating {rating}"><i class="icon-star"></i></p>
  <h3><a href="a-book/index.html" title="{title}">{title}</a></h3>
  <div class="product_price">
    <p class="price_color">{price}</p>
    <p class="instock availability">
      <i class="icon-ok"></i>
        {availability}
    </p>
  </div>
</article></li>
"#,
            slug = title.to_lowercase().replace(' ', "-"),
            title = title,
            rating = rating,
            price = price,
            availability = availability,
        ));
    }

    html.push_str("</ol><ul class=\"pager\">\n");
    for link in links {
        html.push_str(&format!("<li class=\"next\"><a href=\"{}\">next</a></li>\n", link));
    }
    html.push_str("</ul></body></html>\n");
    html
}
