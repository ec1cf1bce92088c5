//! An ethical HTTP crawling toolkit.
//!
//! A [`Crawler`] binds a root origin, respects its `robots.txt`, traverses
//! its declared sitemap graph, and issues rate-limited GETs — optionally
//! across a whitelist of additional origins, each with its own policy.
//!
//! The core invariant: every outbound request, whether issued directly by
//! a caller or internally by [`sitemap::SitemapParser`] while descending a
//! sitemap graph, passes through [`scheduler::Scheduler::get`]. There is
//! exactly one path from "we have a URL" to "a byte leaves the machine."

mod config;
mod crawler;
mod error;
mod fetcher;
mod headers;
mod logger;
mod origin;
mod rate_limiter;
mod resource;
mod robots;
mod scheduler;
mod sitemap;
mod url;

pub use config::{Config, HttpConfig, HttpProxyConfig, LoggerConfig, SitemapConfig};
pub use crawler::Crawler;
pub use error::{EthicrawlError, Result};
pub use fetcher::{Fetcher, HttpFetcher};
pub use headers::Headers;
pub use logger::Logger;
pub use rate_limiter::RateLimiter;
pub use resource::{Request, Resource, Response};
pub use robots::RobotsPolicy;
pub use sitemap::{ChangeFreq, IndexEntry, SitemapDocument, SitemapParser, SitemapRoot, UrlsetEntry};
pub use url::{Scheme, Url};
