//! Explicit, strongly-typed configuration.
//!
//! `Config` is a plain value, constructed with defaults and threaded through
//! `Crawler`/`Scheduler`/`OriginContext` constructors — no process-wide
//! singleton. A caller that wants a stable view across a long traversal
//! calls [`Config::snapshot`], which is nothing more than a `Clone`.

mod http;
mod logger;
mod proxy;
mod sitemap;

pub use http::HttpConfig;
pub use logger::LoggerConfig;
pub use proxy::HttpProxyConfig;
pub use sitemap::SitemapConfig;

/// Top-level configuration value threaded through every component.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub http: HttpConfig,
    pub sitemap: SitemapConfig,
    pub logger: LoggerConfig,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// A stable, independent copy of this configuration.
    pub fn snapshot(&self) -> Config {
        self.clone()
    }
}
