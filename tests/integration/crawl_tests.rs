//! Integration tests for the crawl stage
//!
//! These tests use wiremock to create mock catalog sites and run
//! the full listing-and-detail cycle end-to-end.

use bookscrape::config::{CleaningConfig, Config, OutputConfig, ScraperConfig};
use bookscrape::output::DatasetSummary;
use bookscrape::record::StockQuantity;
use bookscrape::scrape::{CrawlStatus, Orchestrator, Stage};
use bookscrape::ScrapeError;
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration starting at the given listing URL
fn create_test_config(start_url: &str) -> Config {
    Config {
        scraper: ScraperConfig {
            base_url: start_url.to_string(),
            max_pages: 50,
            request_delay_ms: 100, // Shortest allowed, for testing
            fetch_retries: 2,
            user_agent: "bookscrape-test/1.0".to_string(),
        },
        output: OutputConfig {
            raw_dir: "./data/raw".to_string(),
            clean_dir: "./data/clean".to_string(),
        },
        cleaning: CleaningConfig {
            gbp_to_usd_rate: Some(1.27),
        },
    }
}

/// Builds one product card for a listing page
fn product_card(title: &str, price: &str, rating: &str, href: &str) -> String {
    format!(
        r#"<article class="product_pod">
            <p class="star-rating {rating}"></p>
            <h3><a href="{href}" title="{title}">{title}</a></h3>
            <p class="price_color">{price}</p>
            <p class="instock availability">In stock</p>
        </article>"#,
        rating = rating,
        href = href,
        title = title,
        price = price,
    )
}

/// Builds a listing page from cards and an optional next link
fn listing_page(cards: &[String], next_href: Option<&str>) -> String {
    let pager = match next_href {
        Some(href) => format!(
            r#"<ul class="pager"><li class="next"><a href="{}">next</a></li></ul>"#,
            href
        ),
        None => String::new(),
    };
    format!(
        r#"<html><head><title>Catalog</title></head><body>
        <section>{}</section>
        {}
        </body></html>"#,
        cards.join("\n"),
        pager
    )
}

/// Builds a product detail page
fn detail_page(upc: &str, category: &str, availability: &str, description: Option<&str>) -> String {
    let description_block = match description {
        Some(text) => format!(
            r#"<div id="product_description" class="sub-header"><h2>Product Description</h2></div>
            <p>{}</p>"#,
            text
        ),
        None => String::new(),
    };
    format!(
        r#"<html><head><title>Book</title></head><body>
        <ul class="breadcrumb">
            <li><a href="/index.html">Home</a></li>
            <li><a href="/books.html">Books</a></li>
            <li><a href="/category.html">{category}</a></li>
            <li class="active">A Book</li>
        </ul>
        <p class="availability">{availability}</p>
        {description}
        <table class="table table-striped">
            <tr><th>UPC</th><td>{upc}</td></tr>
            <tr><th>Product Type</th><td>Books</td></tr>
        </table>
        </body></html>"#,
        category = category,
        availability = availability,
        description = description_block,
        upc = upc,
    )
}

/// Mounts a 200 response with the given body at a route
async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_two_page_crawl_collects_records_in_order() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let page_one = listing_page(
        &[
            product_card("Book One", "£10.00", "Three", "book-one.html"),
            product_card("Book Two", "£20.00", "One", "book-two.html"),
        ],
        Some("page-2.html"),
    );
    let page_two = listing_page(
        &[product_card("Book Three", "£30.00", "Five", "book-three.html")],
        None,
    );

    mount_page(&mock_server, "/page-1.html", page_one).await;
    mount_page(&mock_server, "/page-2.html", page_two).await;
    mount_page(
        &mock_server,
        "/book-one.html",
        detail_page(
            "upc-1",
            "Poetry",
            "In stock (22 available)",
            Some("First description"),
        ),
    )
    .await;
    mount_page(
        &mock_server,
        "/book-two.html",
        detail_page("upc-2", "Fiction", "In stock (3 available)", None),
    )
    .await;
    mount_page(
        &mock_server,
        "/book-three.html",
        detail_page("upc-3", "Travel", "Out of stock", Some("Third description")),
    )
    .await;

    let config = create_test_config(&format!("{}/page-1.html", base_url));
    let mut orchestrator = Orchestrator::new(&config).expect("Failed to create orchestrator");
    let report = orchestrator.run().await.expect("Crawl failed");

    assert_eq!(report.status, CrawlStatus::Completed);
    assert_eq!(report.pages_visited, 2);
    assert!(report.page_failures.is_empty());
    assert!(report.item_failures.is_empty());

    // Records arrive in page order, then card order within each page
    let titles: Vec<_> = report.records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Book One", "Book Two", "Book Three"]);

    let first = &report.records[0];
    assert_eq!(first.price_gbp, 10.0);
    assert_eq!(first.rating, 3);
    assert_eq!(first.category, "Poetry");
    assert_eq!(first.upc, "upc-1");
    // The detail page's availability wins over the listing card's
    assert_eq!(first.availability, "In stock (22 available)");
    assert_eq!(first.stock_quantity, StockQuantity::Count(22));
    assert_eq!(first.description.as_deref(), Some("First description"));
    assert!(first.product_page_url.ends_with("/book-one.html"));

    // A detail page without a description leaves the field absent
    assert_eq!(report.records[1].description, None);
    assert_eq!(report.records[1].stock_quantity, StockQuantity::Count(3));
    assert_eq!(report.records[2].stock_quantity, StockQuantity::Count(0));
}

#[tokio::test]
async fn test_unrated_item_is_skipped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // A card with no star-rating element at all
    let unrated = r#"<article class="product_pod">
        <h3><a href="unrated.html" title="Unrated">Unrated</a></h3>
        <p class="price_color">£15.00</p>
        <p class="instock availability">In stock</p>
    </article>"#
        .to_string();
    let page = listing_page(
        &[product_card("Rated", "£10.00", "Two", "rated.html"), unrated],
        None,
    );

    mount_page(&mock_server, "/page-1.html", page).await;
    mount_page(
        &mock_server,
        "/rated.html",
        detail_page("upc-1", "Poetry", "In stock", Some("Fine")),
    )
    .await;
    mount_page(
        &mock_server,
        "/unrated.html",
        detail_page("upc-2", "Poetry", "In stock", None),
    )
    .await;

    let config = create_test_config(&format!("{}/page-1.html", base_url));
    let mut orchestrator = Orchestrator::new(&config).expect("Failed to create orchestrator");
    let report = orchestrator.run().await.expect("Crawl failed");

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].title, "Rated");
    assert_eq!(report.item_failures.len(), 1);

    let failure = &report.item_failures[0];
    assert_eq!(failure.stage, Stage::Normalize);
    assert!(failure.url.ends_with("/unrated.html"));
    assert_eq!(report.status, CrawlStatus::Completed);
}

#[tokio::test]
async fn test_malformed_card_is_reported_against_the_page() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // A card with no title link never reaches the detail fetch
    let broken = r#"<article class="product_pod">
        <p class="price_color">£9.00</p>
    </article>"#
        .to_string();
    let page = listing_page(
        &[product_card("Whole", "£10.00", "Four", "whole.html"), broken],
        None,
    );

    mount_page(&mock_server, "/page-1.html", page).await;
    mount_page(
        &mock_server,
        "/whole.html",
        detail_page("upc-1", "Poetry", "In stock", None),
    )
    .await;

    let config = create_test_config(&format!("{}/page-1.html", base_url));
    let mut orchestrator = Orchestrator::new(&config).expect("Failed to create orchestrator");
    let report = orchestrator.run().await.expect("Crawl failed");

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.item_failures.len(), 1);

    let failure = &report.item_failures[0];
    assert_eq!(failure.stage, Stage::Parse);
    assert!(failure.url.ends_with("/page-1.html"));
}

#[tokio::test]
async fn test_unreachable_detail_page_skips_item() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let page = listing_page(
        &[
            product_card("Reachable", "£10.00", "One", "reachable.html"),
            product_card("Broken", "£20.00", "Two", "broken.html"),
        ],
        None,
    );

    mount_page(&mock_server, "/page-1.html", page).await;
    mount_page(
        &mock_server,
        "/reachable.html",
        detail_page("upc-1", "Poetry", "In stock", None),
    )
    .await;

    // One initial attempt plus two retries before the item is given up
    Mock::given(method("GET"))
        .and(path("/broken.html"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&format!("{}/page-1.html", base_url));
    let mut orchestrator = Orchestrator::new(&config).expect("Failed to create orchestrator");
    let report = orchestrator.run().await.expect("Crawl failed");

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].title, "Reachable");
    assert_eq!(report.item_failures.len(), 1);

    let failure = &report.item_failures[0];
    assert_eq!(failure.stage, Stage::Fetch);
    assert!(failure.url.ends_with("/broken.html"));
    assert!(failure.message.contains("500"));
    assert_eq!(report.status, CrawlStatus::Completed);
}

#[tokio::test]
async fn test_failed_page_is_skipped_by_pattern() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let page_one = listing_page(
        &[product_card("Book One", "£10.00", "One", "book-one.html")],
        Some("page-2.html"),
    );
    let page_three = listing_page(
        &[product_card("Book Three", "£30.00", "Three", "book-three.html")],
        None,
    );

    mount_page(&mock_server, "/page-1.html", page_one).await;
    mount_page(&mock_server, "/page-3.html", page_three).await;
    mount_page(
        &mock_server,
        "/book-one.html",
        detail_page("upc-1", "Poetry", "In stock", None),
    )
    .await;
    mount_page(
        &mock_server,
        "/book-three.html",
        detail_page("upc-3", "Poetry", "In stock", None),
    )
    .await;

    // One initial attempt plus two retries before the page is given up
    Mock::given(method("GET"))
        .and(path("/page-2.html"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&format!("{}/page-1.html", base_url));
    let mut orchestrator = Orchestrator::new(&config).expect("Failed to create orchestrator");
    let report = orchestrator.run().await.expect("Crawl failed");

    // Page 2 is lost but its successor is reached through the URL pattern
    assert_eq!(report.pages_visited, 2);
    assert_eq!(report.page_failures.len(), 1);
    assert!(report.page_failures[0].url.ends_with("/page-2.html"));
    assert!(report.page_failures[0].message.contains("500"));
    assert_eq!(report.status, CrawlStatus::Completed);

    let titles: Vec<_> = report.records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Book One", "Book Three"]);
}

#[tokio::test]
async fn test_unpatterned_failed_page_ends_crawl_incomplete() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let index = listing_page(
        &[product_card("Book One", "£10.00", "One", "book-one.html")],
        Some("other.html"),
    );

    mount_page(&mock_server, "/index.html", index).await;
    mount_page(
        &mock_server,
        "/book-one.html",
        detail_page("upc-1", "Poetry", "In stock", None),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/other.html"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&format!("{}/index.html", base_url));
    let mut orchestrator = Orchestrator::new(&config).expect("Failed to create orchestrator");
    let report = orchestrator.run().await.expect("Crawl failed");

    // No page number to increment, so the crawl ends early
    assert_eq!(report.status, CrawlStatus::Incomplete);
    assert_eq!(report.pages_visited, 1);
    assert_eq!(report.page_failures.len(), 1);
    assert_eq!(report.records.len(), 1);
}

#[tokio::test]
async fn test_unreachable_start_is_fatal() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/page-1.html"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&format!("{}/page-1.html", base_url));
    config.scraper.max_pages = 2; // Bound the pattern walk

    let mut orchestrator = Orchestrator::new(&config).expect("Failed to create orchestrator");
    let result = orchestrator.run().await;

    assert!(matches!(result, Err(ScrapeError::NothingFetched { .. })));
}

#[tokio::test]
async fn test_max_pages_caps_the_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    for page in 1..=2 {
        let body = listing_page(
            &[product_card(
                &format!("Book {}", page),
                "£10.00",
                "One",
                &format!("book-{}.html", page),
            )],
            Some(&format!("page-{}.html", page + 1)),
        );
        mount_page(&mock_server, &format!("/page-{}.html", page), body).await;
        mount_page(
            &mock_server,
            &format!("/book-{}.html", page),
            detail_page(&format!("upc-{}", page), "Poetry", "In stock", None),
        )
        .await;
    }

    // The third page exists but the limit stops the crawl before it
    Mock::given(method("GET"))
        .and(path("/page-3.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&[], None)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&format!("{}/page-1.html", base_url));
    config.scraper.max_pages = 2;

    let mut orchestrator = Orchestrator::new(&config).expect("Failed to create orchestrator");
    let report = orchestrator.run().await.expect("Crawl failed");

    assert_eq!(report.pages_visited, 2);
    assert_eq!(report.records.len(), 2);
    assert!(report.page_failures.is_empty());
    assert_eq!(report.status, CrawlStatus::Completed);
}

#[tokio::test]
async fn test_duplicate_upcs_across_pages_survive() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let page_one = listing_page(
        &[product_card("First Copy", "£10.00", "One", "first.html")],
        Some("page-2.html"),
    );
    let page_two = listing_page(
        &[product_card("Second Copy", "£12.00", "Two", "second.html")],
        None,
    );

    mount_page(&mock_server, "/page-1.html", page_one).await;
    mount_page(&mock_server, "/page-2.html", page_two).await;
    mount_page(
        &mock_server,
        "/first.html",
        detail_page("same-upc", "Poetry", "In stock", None),
    )
    .await;
    mount_page(
        &mock_server,
        "/second.html",
        detail_page("same-upc", "Poetry", "In stock", None),
    )
    .await;

    let config = create_test_config(&format!("{}/page-1.html", base_url));
    let mut orchestrator = Orchestrator::new(&config).expect("Failed to create orchestrator");
    let report = orchestrator.run().await.expect("Crawl failed");

    // Both rows are kept; only the summary flags the shared key
    assert_eq!(report.records.len(), 2);
    let summary = DatasetSummary::compute(&report.records);
    assert_eq!(summary.duplicate_upcs, vec!["same-upc".to_string()]);
}

#[tokio::test]
async fn test_requests_are_paced() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let page = listing_page(
        &[
            product_card("Book One", "£10.00", "One", "book-one.html"),
            product_card("Book Two", "£20.00", "Two", "book-two.html"),
        ],
        None,
    );

    mount_page(&mock_server, "/page-1.html", page).await;
    mount_page(
        &mock_server,
        "/book-one.html",
        detail_page("upc-1", "Poetry", "In stock", None),
    )
    .await;
    mount_page(
        &mock_server,
        "/book-two.html",
        detail_page("upc-2", "Poetry", "In stock", None),
    )
    .await;

    let config = create_test_config(&format!("{}/page-1.html", base_url));
    let mut orchestrator = Orchestrator::new(&config).expect("Failed to create orchestrator");

    let started = Instant::now();
    let report = orchestrator.run().await.expect("Crawl failed");

    // Three requests with a 100ms floor between them take at least 200ms
    assert_eq!(report.records.len(), 2);
    assert!(
        started.elapsed() >= Duration::from_millis(200),
        "requests were not paced: {:?}",
        started.elapsed()
    );
}
