//! Rate-limited, policy-enforcing request scheduler.
//!
//! A single chokepoint that every outbound request — including the ones
//! `SitemapParser` issues while descending a sitemap graph — must pass
//! through.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::{EthicrawlError, Result};
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::headers::Headers;
use crate::logger::Logger;
use crate::origin::OriginContext;
use crate::rate_limiter::RateLimiter;
use crate::resource::{Request, Resource, Response};
use crate::robots::RobotsPolicy;
use crate::sitemap::{SitemapParser, SitemapRoot, UrlsetEntry};

/// Registry of [`OriginContext`]s, one `RateLimiter` shared across all of
/// them. `!Sync` by design (a plain `HashMap`, no internal lock) — a caller
/// needing cross-thread sharing wraps the whole `Scheduler` in a `Mutex`.
pub struct Scheduler {
    contexts: HashMap<String, OriginContext>,
    rate_limiter: RateLimiter,
    default_fetcher: Arc<dyn Fetcher>,
    config: Config,
    logger: Logger,
}

impl Scheduler {
    pub fn new(config: Config) -> Result<Self> {
        let default_fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(&config.http)?);
        let rate_limiter = RateLimiter::new(
            Duration::from_secs_f64(config.http.min_interval_secs()),
            config.http.jitter(),
        );
        let logger = Logger::new("scheduler", config.logger.clone());
        Ok(Scheduler {
            contexts: HashMap::new(),
            rate_limiter,
            default_fetcher,
            config,
            logger,
        })
    }

    /// Register `resource`'s origin, replacing any prior context for the
    /// same base (idempotent re-bind, matching the source's behavior).
    /// `robots.txt` is fetched and parsed here, eagerly.
    pub fn bind(&mut self, resource: &Resource, fetcher: Option<Arc<dyn Fetcher>>) -> Result<()> {
        let base = resource.url.base();
        let fetcher = fetcher.unwrap_or_else(|| self.default_fetcher.clone());
        let ctx = OriginContext::new(
            resource,
            fetcher,
            self.config.clone(),
            self.logger.scoped(&base),
        )?;
        self.contexts.insert(base, ctx);
        Ok(())
    }

    pub fn unbind(&mut self, resource: &Resource) -> Result<()> {
        let base = resource.url.base();
        self.contexts
            .remove(&base)
            .map(|_| ())
            .ok_or_else(|| EthicrawlError::NotBound(resource.url.clone()))
    }

    fn context(&self, resource: &Resource) -> Result<&OriginContext> {
        self.contexts
            .get(&resource.url.base())
            .ok_or_else(|| EthicrawlError::NotWhitelisted(resource.url.clone()))
    }

    pub fn robot(&self, resource: &Resource) -> Result<&RobotsPolicy> {
        Ok(self.context(resource)?.robot())
    }

    pub fn sitemap(&self, resource: &Resource) -> Result<&SitemapParser> {
        Ok(self.context(resource)?.sitemap_parser())
    }

    /// The sole path from "we have a URL" to "a byte leaves the machine":
    /// whitelist check, robots check, rate limiting, dispatch, in that
    /// order.
    pub fn get(&self, resource: &Resource, headers: Option<Headers>) -> Result<Response> {
        let ctx = self.context(resource)?;
        let headers = headers.unwrap_or_default();

        let effective_ua = headers
            .get("user-agent")
            .map(str::to_string)
            .unwrap_or_else(|| ctx.fetcher().user_agent());

        ctx.robot().can_fetch(&resource.url, &effective_ua)?;

        self.rate_limiter.wait_for_slot();

        let request = Request::new(
            resource.clone(),
            Duration::from_secs_f64(self.config.http.timeout()),
            headers,
        )?;
        ctx.fetcher().get(&request)
    }

    /// Traverse `resource`'s sitemap graph, routing every fetch it issues
    /// back through [`Scheduler::get`].
    pub fn sitemap_entries(&self, resource: &Resource, root: SitemapRoot) -> Result<Vec<UrlsetEntry>> {
        let ctx = self.context(resource)?;
        let parser = ctx.sitemap_parser();
        let mut fetch = |r: &Resource| self.get(r, None);
        Ok(parser.parse(root, &mut fetch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Resource;
    use crate::url::Url;

    struct MockFetcher;
    impl Fetcher for MockFetcher {
        fn get(&self, request: &Request) -> Result<Response> {
            if request.url().path() == "/robots.txt" {
                return Response::new(request.clone(), 404, Headers::new(), Vec::new());
            }
            Response::new(request.clone(), 200, Headers::new(), b"hello".to_vec())
        }
        fn user_agent(&self) -> String {
            "MockBot/1.0".to_string()
        }
        fn set_user_agent(&self, _agent: &str) {}
    }

    #[test]
    fn unbound_origin_is_rejected() {
        let scheduler = Scheduler::new(Config::default()).unwrap();
        let resource = Resource::new(Url::parse("https://example.com/x", false).unwrap());
        assert!(matches!(
            scheduler.get(&resource, None),
            Err(EthicrawlError::NotWhitelisted(_))
        ));
    }

    #[test]
    fn bind_then_get_round_trips() {
        let mut scheduler = Scheduler::new(Config::default()).unwrap();
        let root = Resource::new(Url::parse("https://example.com/", false).unwrap());
        scheduler.bind(&root, Some(Arc::new(MockFetcher))).unwrap();

        let page = Resource::new(Url::parse("https://example.com/page", false).unwrap());
        let response = scheduler.get(&page, None).unwrap();
        assert_eq!(response.text(), "hello");
    }

    #[test]
    fn unbind_unknown_origin_fails() {
        let mut scheduler = Scheduler::new(Config::default()).unwrap();
        let resource = Resource::new(Url::parse("https://example.com/", false).unwrap());
        assert!(matches!(
            scheduler.unbind(&resource),
            Err(EthicrawlError::NotBound(_))
        ));
    }
}
