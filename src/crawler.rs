//! `Crawler`: the embedder-facing façade over a `Scheduler`.

use std::sync::Arc;

use crate::config::Config;
use crate::error::{EthicrawlError, Result};
use crate::fetcher::Fetcher;
use crate::headers::Headers;
use crate::resource::{Resource, Response};
use crate::robots::RobotsPolicy;
use crate::scheduler::Scheduler;
use crate::sitemap::{SitemapParser, SitemapRoot, UrlsetEntry};
use crate::url::Url;

/// Binds a single root origin (plus any number of whitelisted ones) and
/// exposes a simple `get`/`robots`/`sitemaps` surface, delegating all
/// policy enforcement to the [`Scheduler`] underneath.
pub struct Crawler {
    scheduler: Scheduler,
    root: Option<Resource>,
}

impl Crawler {
    pub fn new(config: Config) -> Result<Self> {
        Ok(Crawler {
            scheduler: Scheduler::new(config)?,
            root: None,
        })
    }

    /// Register the root origin this crawler operates against. Fails with
    /// [`EthicrawlError::AlreadyBound`] if a root is already bound.
    pub fn bind(&mut self, url: Url, fetcher: Option<Arc<dyn Fetcher>>) -> Result<()> {
        if self.root.is_some() {
            return Err(EthicrawlError::AlreadyBound);
        }
        let resource = Resource::new(url);
        self.scheduler.bind(&resource, fetcher)?;
        self.root = Some(resource);
        Ok(())
    }

    /// Release the bound root and every per-bind state it carried.
    pub fn unbind(&mut self) -> Result<()> {
        let root = self.root.take().ok_or_else(|| {
            EthicrawlError::NotBound(Url::parse("https://unbound.invalid", false).unwrap())
        })?;
        self.scheduler.unbind(&root)
    }

    /// Register an additional origin, independent of the bound root, with
    /// its own `RobotsPolicy` and `SitemapParser`.
    pub fn whitelist(&mut self, url: Url, fetcher: Option<Arc<dyn Fetcher>>) -> Result<()> {
        let resource = Resource::new(url);
        self.scheduler.bind(&resource, fetcher)
    }

    /// Fetch `url` through the scheduler: whitelist check, robots check,
    /// rate limiting, dispatch.
    pub fn get(&self, url: Url, headers: Option<Headers>) -> Result<Response> {
        let resource = Resource::new(url);
        self.scheduler.get(&resource, headers)
    }

    fn root(&self) -> Result<&Resource> {
        self.root.as_ref().ok_or_else(|| {
            EthicrawlError::NotBound(Url::parse("https://unbound.invalid", false).unwrap())
        })
    }

    pub fn robots(&self) -> Result<&RobotsPolicy> {
        self.scheduler.robot(self.root()?)
    }

    pub fn sitemaps(&self) -> Result<&SitemapParser> {
        self.scheduler.sitemap(self.root()?)
    }

    /// Traverse the bound root's declared sitemaps (from `robots.txt`) and
    /// return the flattened list of `UrlsetEntry`s.
    pub fn crawl_sitemaps(&self) -> Result<Vec<UrlsetEntry>> {
        let root = self.root()?;
        let declared = self.scheduler.robot(root)?.declared_sitemaps().to_vec();
        self.scheduler
            .sitemap_entries(root, SitemapRoot::Index(declared))
    }
}
