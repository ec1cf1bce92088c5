//! End-to-end scenarios driven entirely through the `Crawler` façade,
//! using an in-process mock `Fetcher` standing in for the network.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use ethicrawl::{Config, Crawler, EthicrawlError, Fetcher, Headers, Request, Response, Url};

/// Serves fixed bodies keyed by exact URL string; anything unmapped 404s.
struct MockFetcher {
    routes: HashMap<String, (u16, Vec<u8>)>,
    user_agent: Mutex<String>,
}

impl MockFetcher {
    fn new(routes: Vec<(&str, u16, &[u8])>) -> Self {
        MockFetcher {
            routes: routes
                .into_iter()
                .map(|(url, status, body)| (url.to_string(), (status, body.to_vec())))
                .collect(),
            user_agent: Mutex::new("Ethicrawl/1.0".to_string()),
        }
    }
}

impl Fetcher for MockFetcher {
    fn get(&self, request: &Request) -> ethicrawl::Result<Response> {
        let url = request.url().to_string();
        match self.routes.get(&url) {
            Some((status, body)) => Response::new(request.clone(), *status, Headers::new(), body.clone()),
            None => Response::new(request.clone(), 404, Headers::new(), Vec::new()),
        }
    }

    fn user_agent(&self) -> String {
        self.user_agent.lock().unwrap().clone()
    }

    fn set_user_agent(&self, agent: &str) {
        *self.user_agent.lock().unwrap() = agent.to_string();
    }
}

#[test]
fn allowed_fetch_succeeds() {
    let fetcher = MockFetcher::new(vec![
        ("https://example.com/robots.txt", 200, b"User-agent: *\nAllow: /\n"),
        ("https://example.com/page", 200, b"hello"),
    ]);

    let mut crawler = Crawler::new(Config::default()).unwrap();
    crawler
        .bind(Url::parse("https://example.com/", false).unwrap(), Some(Arc::new(fetcher)))
        .unwrap();

    let response = crawler
        .get(Url::parse("https://example.com/page", false).unwrap(), None)
        .unwrap();
    assert_eq!(response.text(), "hello");
}

#[test]
fn disallowed_fetch_is_rejected() {
    let fetcher = MockFetcher::new(vec![
        (
            "https://example.com/robots.txt",
            200,
            b"User-agent: *\nDisallow: /private/\n",
        ),
        ("https://example.com/private/secret", 200, b"nope"),
    ]);

    let mut crawler = Crawler::new(Config::default()).unwrap();
    crawler
        .bind(Url::parse("https://example.com/", false).unwrap(), Some(Arc::new(fetcher)))
        .unwrap();

    let err = crawler
        .get(Url::parse("https://example.com/private/secret", false).unwrap(), None)
        .unwrap_err();
    assert!(matches!(err, EthicrawlError::Disallowed { .. }));
}

#[test]
fn per_request_user_agent_overrides_default() {
    let fetcher = MockFetcher::new(vec![
        (
            "https://example.com/robots.txt",
            200,
            b"User-agent: BadBot\nDisallow: /\nUser-agent: *\nAllow: /\n",
        ),
        ("https://example.com/page", 200, b"hello"),
    ]);

    let mut crawler = Crawler::new(Config::default()).unwrap();
    crawler
        .bind(Url::parse("https://example.com/", false).unwrap(), Some(Arc::new(fetcher)))
        .unwrap();

    let page = Url::parse("https://example.com/page", false).unwrap();

    // Default fetcher UA ("Ethicrawl/1.0") falls under the `*` group: allowed.
    assert!(crawler.get(page.clone(), None).is_ok());

    // Explicit override to the disallowed UA is honored and denied.
    let mut headers = Headers::new();
    headers.insert("User-Agent", "BadBot");
    let err = crawler.get(page, Some(headers)).unwrap_err();
    assert!(matches!(err, EthicrawlError::Disallowed { .. }));
}

#[test]
fn whitelist_boundary_is_enforced() {
    let root_fetcher = MockFetcher::new(vec![
        ("https://example.com/robots.txt", 200, b"User-agent: *\nAllow: /\n"),
    ]);
    let other_fetcher = MockFetcher::new(vec![
        ("https://other.example/robots.txt", 200, b"User-agent: *\nAllow: /\n"),
        ("https://other.example/asset.js", 200, b"console.log(1)"),
    ]);

    let mut crawler = Crawler::new(Config::default()).unwrap();
    crawler
        .bind(
            Url::parse("https://example.com/", false).unwrap(),
            Some(Arc::new(root_fetcher)),
        )
        .unwrap();

    let other_url = Url::parse("https://other.example/asset.js", false).unwrap();
    assert!(matches!(
        crawler.get(other_url.clone(), None),
        Err(EthicrawlError::NotWhitelisted(_))
    ));

    crawler
        .whitelist(
            Url::parse("https://other.example/", false).unwrap(),
            Some(Arc::new(other_fetcher)),
        )
        .unwrap();

    let response = crawler.get(other_url, None).unwrap();
    assert_eq!(response.text(), "console.log(1)");
}

#[test]
fn sitemap_traversal_survives_a_cycle() {
    let fetcher = MockFetcher::new(vec![
        (
            "https://example.com/robots.txt",
            200,
            b"User-agent: *\nAllow: /\nSitemap: https://example.com/a.xml\n",
        ),
        (
            "https://example.com/a.xml",
            200,
            br#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"><sitemap><loc>https://example.com/b.xml</loc></sitemap></sitemapindex>"#,
        ),
        (
            "https://example.com/b.xml",
            200,
            br#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"><sitemap><loc>https://example.com/a.xml</loc></sitemap><sitemap><loc>https://example.com/c.xml</loc></sitemap></sitemapindex>"#,
        ),
        (
            "https://example.com/c.xml",
            200,
            br#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"><url><loc>https://example.com/page1</loc></url><url><loc>https://example.com/page2</loc></url></urlset>"#,
        ),
    ]);

    let mut crawler = Crawler::new(Config::default()).unwrap();
    crawler
        .bind(Url::parse("https://example.com/", false).unwrap(), Some(Arc::new(fetcher)))
        .unwrap();

    let entries = crawler.crawl_sitemaps().unwrap();
    let urls: Vec<String> = entries.iter().map(|e| e.url.to_string()).collect();
    assert_eq!(urls.len(), 2);
    assert!(urls.contains(&"https://example.com/page1".to_string()));
    assert!(urls.contains(&"https://example.com/page2".to_string()));
}

#[test]
fn sitemap_depth_cutoff_truncates_before_the_leaf() {
    let fetcher = MockFetcher::new(vec![
        (
            "https://example.com/robots.txt",
            200,
            b"User-agent: *\nAllow: /\nSitemap: https://example.com/a.xml\n",
        ),
        (
            "https://example.com/a.xml",
            200,
            br#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"><sitemap><loc>https://example.com/b.xml</loc></sitemap></sitemapindex>"#,
        ),
        (
            "https://example.com/b.xml",
            200,
            br#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"><sitemap><loc>https://example.com/c.xml</loc></sitemap></sitemapindex>"#,
        ),
        (
            "https://example.com/c.xml",
            200,
            br#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"><sitemap><loc>https://example.com/d.xml</loc></sitemap></sitemapindex>"#,
        ),
        (
            "https://example.com/d.xml",
            200,
            br#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"><url><loc>https://example.com/page</loc></url></urlset>"#,
        ),
    ]);

    let mut config = Config::default();
    config.sitemap.set_max_depth(2).unwrap();

    let mut crawler = Crawler::new(config).unwrap();
    crawler
        .bind(Url::parse("https://example.com/", false).unwrap(), Some(Arc::new(fetcher)))
        .unwrap();

    let entries = crawler.crawl_sitemaps().unwrap();
    assert!(entries.is_empty());
}
