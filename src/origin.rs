//! Per-origin bundle: fetcher, robots policy, sitemap parser, logger.

use std::cell::OnceCell;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::Result;
use crate::fetcher::Fetcher;
use crate::headers::Headers;
use crate::logger::Logger;
use crate::resource::{Request, Resource};
use crate::robots::RobotsPolicy;
use crate::sitemap::SitemapParser;
use crate::url::Url;

/// Everything the `Scheduler` needs to serve one registered origin.
///
/// Every registered origin, root or whitelisted, is represented the same
/// way — there is no separate root-only struct.
pub struct OriginContext {
    base: Url,
    fetcher: Arc<dyn Fetcher>,
    robots: RobotsPolicy,
    sitemap_parser: OnceCell<SitemapParser>,
    config: Config,
    logger: Logger,
}

impl OriginContext {
    /// Construct a context for `resource`'s origin, eagerly fetching and
    /// parsing `robots.txt` so that transport/DNS failures surface at bind
    /// time rather than on the first crawl request.
    pub fn new(
        resource: &Resource,
        fetcher: Arc<dyn Fetcher>,
        config: Config,
        logger: Logger,
    ) -> Result<Self> {
        let base = Url::parse(&resource.url.base(), false)?;
        let robots_url = base.extend_path("/robots.txt")?;
        let robots_logger = logger.scoped("robots");

        let request = Request::new(
            Resource::new(robots_url),
            Duration::from_secs_f64(config.http.timeout()),
            Headers::new(),
        )?;
        let response = fetcher.get(&request).ok();

        let robots = RobotsPolicy::from_response(base.clone(), response.as_ref(), robots_logger)?;

        Ok(OriginContext {
            base,
            fetcher,
            robots,
            sitemap_parser: OnceCell::new(),
            config,
            logger,
        })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn robot(&self) -> &RobotsPolicy {
        &self.robots
    }

    pub fn sitemap_parser(&self) -> &SitemapParser {
        self.sitemap_parser.get_or_init(|| {
            SitemapParser::new(self.config.sitemap.clone(), self.logger.scoped("sitemap"))
        })
    }

    pub fn fetcher(&self) -> &Arc<dyn Fetcher> {
        &self.fetcher
    }

    pub fn logger(&self, component: &str) -> Logger {
        self.logger.scoped(component)
    }
}
