use crate::UrlError;
use url::Url;

/// Decides which discovered links belong to the catalogue being scanned
///
/// A link is accepted when it lives on the same site as the seed (host and
/// port) and either its path contains the catalogue page pattern, e.g.
/// `catalogue/page-`, or it is the site root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteFilter {
    host: String,
    port: Option<u16>,
    page_pattern: String,
}

impl SiteFilter {
    /// Builds a filter for the site the seed URL belongs to
    ///
    /// # Examples
    ///
    /// ```
    /// use shelf_scan::url::SiteFilter;
    /// use url::Url;
    ///
    /// let seed = Url::parse("http://books.example.com/index.html").unwrap();
    /// let filter = SiteFilter::for_seed(&seed, "catalogue/page-").unwrap();
    ///
    /// assert!(filter.accepts(&Url::parse("http://books.example.com/catalogue/page-2.html").unwrap()));
    /// assert!(!filter.accepts(&Url::parse("http://books.example.com/catalogue/a-book_1/index.html").unwrap()));
    /// assert!(!filter.accepts(&Url::parse("http://other.example.com/catalogue/page-2.html").unwrap()));
    /// ```
    pub fn for_seed(seed: &Url, page_pattern: &str) -> Result<Self, UrlError> {
        let host = seed
            .host_str()
            .map(str::to_lowercase)
            .ok_or(UrlError::MissingDomain)?;

        Ok(Self {
            host,
            port: seed.port_or_known_default(),
            page_pattern: page_pattern.to_string(),
        })
    }

    /// Returns true if the URL is a catalogue page or the root of the seed's site
    pub fn accepts(&self, url: &Url) -> bool {
        self.is_same_site(url) && (url.path() == "/" || url.path().contains(&self.page_pattern))
    }

    /// Returns true if the URL is served by the seed's host and port
    pub fn is_same_site(&self, url: &Url) -> bool {
        let host_matches = url
            .host_str()
            .map(|host| host.eq_ignore_ascii_case(&self.host))
            .unwrap_or(false);

        host_matches && url.port_or_known_default() == self.port
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

/// Returns true for the seed URL itself and for site index pages
///
/// Index pages are explored during discovery but are left out of the list of
/// pages handed to the pipeline.
pub fn is_index_url(url: &str, seed: &str) -> bool {
    url == seed || url.ends_with("index.html")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> SiteFilter {
        let seed = Url::parse("http://books.toscrape.com/index.html").unwrap();
        SiteFilter::for_seed(&seed, "catalogue/page-").unwrap()
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_accepts_catalogue_pages() {
        let filter = filter();
        assert!(filter.accepts(&url("http://books.toscrape.com/catalogue/page-1.html")));
        assert!(filter.accepts(&url("http://books.toscrape.com/catalogue/page-50.html")));
    }

    #[test]
    fn test_accepts_site_root() {
        let filter = filter();
        assert!(filter.accepts(&url("http://books.toscrape.com/")));
        assert!(!filter.accepts(&url("http://quotes.toscrape.com/")));
    }

    #[test]
    fn test_rejects_other_paths() {
        let filter = filter();
        assert!(!filter.accepts(&url("http://books.toscrape.com/index.html")));
        assert!(!filter.accepts(&url(
            "http://books.toscrape.com/catalogue/category/books_1/index.html"
        )));
    }

    #[test]
    fn test_rejects_other_hosts() {
        let filter = filter();
        assert!(!filter.accepts(&url("http://quotes.toscrape.com/catalogue/page-2.html")));
        assert!(!filter.accepts(&url("http://toscrape.com/catalogue/page-2.html")));
    }

    #[test]
    fn test_port_must_match() {
        let seed = url("http://127.0.0.1:4000/index.html");
        let filter = SiteFilter::for_seed(&seed, "catalogue/page-").unwrap();

        assert!(filter.accepts(&url("http://127.0.0.1:4000/catalogue/page-2.html")));
        assert!(!filter.accepts(&url("http://127.0.0.1:4001/catalogue/page-2.html")));
    }

    #[test]
    fn test_default_port_equivalence() {
        let filter = filter();
        assert!(filter.accepts(&url("http://books.toscrape.com:80/catalogue/page-2.html")));
        assert!(!filter.accepts(&url("https://books.toscrape.com/catalogue/page-2.html")));
    }

    #[test]
    fn test_host_case_insensitive() {
        let filter = filter();
        assert!(filter.is_same_site(&url("http://BOOKS.toscrape.com/")));
        assert_eq!(filter.host(), "books.toscrape.com");
    }

    #[test]
    fn test_is_index_url() {
        let seed = "http://books.toscrape.com/";
        assert!(is_index_url(seed, seed));
        assert!(is_index_url("http://books.toscrape.com/index.html", seed));
        assert!(!is_index_url("http://books.toscrape.com/catalogue/page-2.html", seed));
    }
}
