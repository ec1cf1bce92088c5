//! Bounded-depth, cycle-safe sitemap graph traversal.
//!
//! `visited` is populated *before* the fetch for an entry is issued rather
//! than after, closing a re-entrancy window a slow or cyclic fetch could
//! otherwise open.
//!
//! The traversal never holds a reference back to the `Scheduler` that owns
//! it — it takes the fetch capability as a closure argument to `parse`
//! instead, avoiding an ownership cycle between `OriginContext` and
//! `Scheduler`.

use std::collections::HashSet;

use crate::config::SitemapConfig;
use crate::error::Result;
use crate::logger::Logger;
use crate::resource::{Resource, Response};

use super::document::SitemapDocument;
use super::entry::{IndexEntry, UrlsetEntry};

/// What to start a traversal from.
pub enum SitemapRoot {
    Index(Vec<IndexEntry>),
    Resources(Vec<Resource>),
    None,
}

/// Drives `SitemapDocument` fetch-and-recurse over a sitemap graph.
pub struct SitemapParser {
    config: SitemapConfig,
    logger: Logger,
}

impl SitemapParser {
    pub fn new(config: SitemapConfig, logger: Logger) -> Self {
        SitemapParser { config, logger }
    }

    /// Traverse from `root`, routing every fetch through `fetch` (in
    /// practice, `Scheduler::get`), returning the flattened list of
    /// `UrlsetEntry`s reachable within `Config.sitemap.max_depth`.
    pub fn parse(
        &self,
        root: SitemapRoot,
        fetch: &mut dyn FnMut(&Resource) -> Result<Response>,
    ) -> Vec<UrlsetEntry> {
        let entries = match root {
            SitemapRoot::Index(entries) => entries,
            SitemapRoot::Resources(resources) => resources
                .into_iter()
                .map(|r| IndexEntry::new(r.url, None))
                .collect(),
            SitemapRoot::None => Vec::new(),
        };
        let mut visited = HashSet::new();
        self.traverse(&entries, 0, &mut visited, fetch)
    }

    fn traverse(
        &self,
        entries: &[IndexEntry],
        depth: u32,
        visited: &mut HashSet<String>,
        fetch: &mut dyn FnMut(&Resource) -> Result<Response>,
    ) -> Vec<UrlsetEntry> {
        if depth >= self.config.max_depth() {
            self.logger
                .warn(format!("sitemap depth {depth} reached max_depth, truncating"));
            return Vec::new();
        }
        let mut out = Vec::new();
        for entry in entries {
            out.extend(self.process_entry(entry, depth, visited, fetch));
        }
        out
    }

    fn process_entry(
        &self,
        entry: &IndexEntry,
        depth: u32,
        visited: &mut HashSet<String>,
        fetch: &mut dyn FnMut(&Resource) -> Result<Response>,
    ) -> Vec<UrlsetEntry> {
        let key = entry.url.to_string();
        if visited.contains(&key) {
            self.logger.warn(format!("cycle detected at {key}, skipping"));
            return Vec::new();
        }
        visited.insert(key.clone());

        let resource = Resource::new(entry.url.clone());
        let response = match fetch(&resource) {
            Ok(r) => r,
            Err(e) => {
                self.logger.warn(format!("failed to fetch sitemap {key}: {e}"));
                return Vec::new();
            }
        };

        let document = match SitemapDocument::parse(&response.content, &self.logger) {
            Ok(d) => d,
            Err(e) => {
                self.logger.warn(format!("invalid sitemap document at {key}: {e}"));
                return Vec::new();
            }
        };

        match document {
            SitemapDocument::UrlsetNode { entries } => entries,
            SitemapDocument::IndexNode { entries } => {
                self.traverse(&entries, depth + 1, visited, fetch)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoggerConfig;
    use crate::headers::Headers;
    use crate::resource::Request;
    use crate::url::Url;
    use std::collections::HashMap;
    use std::time::Duration;

    fn parser(max_depth: u32) -> SitemapParser {
        let mut config = SitemapConfig::default();
        config.set_max_depth(max_depth).unwrap();
        SitemapParser::new(config, Logger::new("sitemap", LoggerConfig::default()))
    }

    fn response_for(url: &Url, body: &'static [u8]) -> Result<Response> {
        let resource = Resource::new(url.clone());
        let request = Request::new(resource, Duration::from_secs(5), Headers::new())?;
        Response::new(request, 200, Headers::new(), body.to_vec())
    }

    #[test]
    fn cyclic_graph_terminates_and_visits_each_url_once() {
        let a = Url::parse("https://example.com/a.xml", false).unwrap();
        let b = Url::parse("https://example.com/b.xml", false).unwrap();

        let a_body: &'static [u8] = br#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"><sitemap><loc>https://example.com/b.xml</loc></sitemap></sitemapindex>"#;
        let b_body: &'static [u8] = br#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"><sitemap><loc>https://example.com/a.xml</loc></sitemap></sitemapindex>"#;

        let mut calls: HashMap<String, u32> = HashMap::new();
        let mut fetch = |resource: &Resource| -> Result<Response> {
            *calls.entry(resource.url.to_string()).or_insert(0) += 1;
            if resource.url == a {
                response_for(&resource.url, a_body)
            } else {
                response_for(&resource.url, b_body)
            }
        };

        let parser = parser(5);
        let entries = parser.parse(SitemapRoot::Index(vec![IndexEntry::new(a.clone(), None)]), &mut fetch);
        assert!(entries.is_empty());
        assert_eq!(calls.get(&a.to_string()), Some(&1));
        assert_eq!(calls.get(&b.to_string()), Some(&1));
    }

    #[test]
    fn depth_cutoff_stops_before_leaf() {
        let chain = [
            ("https://example.com/a.xml", "https://example.com/b.xml"),
            ("https://example.com/b.xml", "https://example.com/c.xml"),
            ("https://example.com/c.xml", "https://example.com/d.xml"),
        ];
        let leaf_url = Url::parse("https://example.com/d.xml", false).unwrap();
        let leaf_body: &'static [u8] = br#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"><url><loc>https://example.com/page</loc></url></urlset>"#;

        let mut visited_urls: Vec<String> = Vec::new();
        let mut fetch = |resource: &Resource| -> Result<Response> {
            visited_urls.push(resource.url.to_string());
            if resource.url == leaf_url {
                return response_for(&resource.url, leaf_body);
            }
            let (_, next) = chain
                .iter()
                .find(|(from, _)| *from == resource.url.to_string())
                .unwrap();
            let body = format!(
                r#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"><sitemap><loc>{next}</loc></sitemap></sitemapindex>"#
            );
            response_for(&resource.url, Box::leak(body.into_boxed_str()).as_bytes())
        };

        let parser = parser(2);
        let a = Url::parse("https://example.com/a.xml", false).unwrap();
        let entries = parser.parse(SitemapRoot::Index(vec![IndexEntry::new(a, None)]), &mut fetch);

        assert!(entries.is_empty());
        assert_eq!(visited_urls.len(), 2);
        assert!(!visited_urls.contains(&"https://example.com/d.xml".to_string()));
    }
}
