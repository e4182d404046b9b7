//! Integration tests for the scanner
//!
//! These tests use wiremock to serve a small catalogue and run the full
//! discover → scrape → analyze → save cycle end-to-end over HTTP.

use shelf_scan::config::Config;
use shelf_scan::{Book, ShelfScan};
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a listing page with the given pager links and books
fn listing_page(links: &[&str], books: &[(&str, &str, &str, &str)]) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html><head><title>All products</title></head><body><ol class=\"row\">\n",
    );

    for (title, price, rating, availability) in books {
        html.push_str(&format!(
            r#"<li><article class="product_pod">
  <div class="image_container"><img src="/media/{title}.jpg" class="thumbnail"></div>
  <p class="star-rating {rating}"><i class="icon-star"></i></p>
  <h3><a href="{title}/index.html" title="{title}">{title}</a></h3>
  <div class="product_price">
    <p class="price_color">{price}</p>
    <p class="instock availability"><i class="icon-ok"></i>
        {availability}
    </p>
  </div>
</article></li>
"#
        ));
    }

    html.push_str("</ol><ul class=\"pager\">\n");
    for link in links {
        html.push_str(&format!("<li class=\"next\"><a href=\"{}\">next</a></li>\n", link));
    }
    html.push_str("</ul></body></html>\n");
    html
}

async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// Serves an index page and four listing pages; page 4 always fails
async fn start_catalogue() -> MockServer {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/index.html",
        listing_page(
            &["catalogue/page-1.html"],
            &[("Front Page Book", "£9.99", "Two", "In stock")],
        ),
    )
    .await;
    mount_page(
        &server,
        "/catalogue/page-1.html",
        listing_page(
            &["page-2.html"],
            &[
                ("Alpha", "£10.00", "Five", "In stock"),
                ("Beta", "£20.00", "Three", "In stock"),
            ],
        ),
    )
    .await;
    mount_page(
        &server,
        "/catalogue/page-2.html",
        listing_page(
            &["page-1.html", "page-3.html"],
            &[
                ("Gamma", "£5.00", "Five", "Out of stock"),
                ("Delta", "£20.00", "One", "In stock"),
            ],
        ),
    )
    .await;
    mount_page(
        &server,
        "/catalogue/page-3.html",
        listing_page(
            &["page-2.html", "page-4.html"],
            &[
                ("Epsilon", "£0.00", "Four", "Out of stock"),
                ("Zeta", "£7.50", "Five", "In stock"),
            ],
        ),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/catalogue/page-4.html"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    server
}

fn test_config(server: &MockServer, results_path: &str) -> Config {
    let mut config = Config::default();
    config.crawler.seed_url = format!("{}/index.html", server.uri());
    config.crawler.max_fetch_retries = 2;
    config.crawler.backoff_base_ms = 1;
    config.crawler.discovery_worker_count = Some(3);
    config.crawler.pipeline_token_budget = Some(4);
    config.http.connect_timeout_secs = 2;
    config.http.request_timeout_secs = 5;
    config.output.results_path = results_path.to_string();
    config
}

#[tokio::test]
async fn test_full_scan_over_http() {
    let server = start_catalogue().await;
    let dir = tempdir().unwrap();
    let base = dir.path().join("results");
    let scan = ShelfScan::new(test_config(&server, base.to_str().unwrap())).unwrap();

    // Discovery finds every listing page, including the broken one
    let urls = scan.discover().await.unwrap();
    let expected: Vec<String> = (1..=4)
        .map(|n| format!("{}/catalogue/page-{}.html", server.uri(), n))
        .collect();
    assert_eq!(urls, expected);

    scan.scrape(&urls).await.unwrap();

    let stats = scan.session().stats_snapshot();
    assert_eq!(stats.pages_processed, 3);
    assert_eq!(stats.failed_requests, 1);
    assert_eq!(stats.books_found, 6);
    assert!(stats.finished_at.is_some());
    assert_eq!(scan.session().visited_count(), 4);

    let analysis = scan.analyze().await.unwrap();
    assert_eq!(analysis.five_star_books, 3);
    assert_eq!(analysis.books_in_stock, 4);
    assert!((analysis.total_value - 62.5).abs() < 1e-9);
    assert_eq!(analysis.cheapest.title, "Gamma");
    assert_eq!(analysis.most_expensive.price, 20.0);
    assert_eq!(analysis.rating_distribution.get(&5), Some(&3));

    let saved = scan.save_results(&analysis).unwrap();

    let report = std::fs::read_to_string(&saved.report).unwrap();
    assert!(report.contains("- Pages processed: 3"));
    assert!(report.contains("- Failed requests: 1"));
    assert!(report.contains("4. Cheapest book: \"Gamma\" (£5.00)"));
    assert!(report.contains("5. Total value of all books: £62.50"));

    let json = std::fs::read_to_string(&saved.books).unwrap();
    let books: Vec<Book> = serde_json::from_str(&json).unwrap();
    assert_eq!(books.len(), 6);
    let alpha = books.iter().find(|b| b.title == "Alpha").unwrap();
    assert_eq!(alpha.star_rating, 5);
    assert_eq!(alpha.image_url, format!("{}/media/Alpha.jpg", server.uri()));
}

#[tokio::test]
async fn test_discovery_respects_page_cap() {
    let server = start_catalogue().await;
    let mut config = test_config(&server, "unused");
    config.crawler.max_pages = 2;
    config.crawler.discovery_worker_count = Some(1);
    let scan = ShelfScan::new(config).unwrap();

    let urls = scan.discover().await.unwrap();

    assert_eq!(scan.session().discovered_count(), 2);
    assert_eq!(urls, vec![format!("{}/catalogue/page-1.html", server.uri())]);
}

#[tokio::test]
async fn test_unreachable_seed_discovers_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let scan = ShelfScan::new(test_config(&server, "unused")).unwrap();

    let urls = scan.discover().await.unwrap();
    assert!(urls.is_empty());

    scan.scrape(&urls).await.unwrap();
    let analysis = scan.analyze().await.unwrap();
    assert_eq!(analysis.five_star_books, 0);
    assert_eq!(analysis.average_price, 0.0);
}

#[tokio::test]
async fn test_rescan_after_reset() {
    let server = start_catalogue().await;
    let scan = ShelfScan::new(test_config(&server, "unused")).unwrap();

    let urls = scan.discover().await.unwrap();
    scan.scrape(&urls).await.unwrap();
    let first = scan.analyze().await.unwrap();

    scan.reset();
    assert_eq!(scan.session().book_count(), 0);

    let urls = scan.discover().await.unwrap();
    scan.scrape(&urls).await.unwrap();
    let second = scan.analyze().await.unwrap();

    assert_eq!(first.total_value, second.total_value);
    assert_eq!(first.five_star_books, second.five_star_books);
    assert_eq!(first.availability_stats, second.availability_stats);
}
