use thiserror::Error;

use crate::Url;

/// Unified error type for every fallible operation in this crate.
///
/// The core never translates one kind into another: whatever raised the
/// error is the kind the caller sees.
#[derive(Error, Debug)]
pub enum EthicrawlError {
    /// A string could not be parsed as a supported `Url`.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// `Url::parse(.., validate: true)` could not resolve the hostname.
    #[error("cannot resolve hostname: {0}")]
    UnresolvableHost(String),

    /// A `Headers` key was not a valid header name.
    #[error("invalid header key: {0}")]
    InvalidHeaderKey(String),

    /// An operation was attempted on a `Url` whose scheme doesn't support it
    /// (e.g. reading `query`/`fragment`/`authority` on a `file:` URL).
    #[error("invalid operation for this URL: {0}")]
    InvalidOperation(String),

    /// The underlying `Fetcher` failed to complete the request.
    #[error("transport error fetching {url}: {source}")]
    TransportError {
        url: Url,
        #[source]
        source: anyhow::Error,
    },

    /// `robots.txt` disallows the effective user-agent from fetching this URL.
    #[error("{url} disallowed by robots.txt for user-agent {user_agent}")]
    Disallowed { url: Url, user_agent: String },

    /// The requested origin is not registered with the `Scheduler`.
    #[error("origin not whitelisted: {0}")]
    NotWhitelisted(Url),

    /// `Scheduler::unbind` was called on an origin that was never bound.
    #[error("origin not bound: {0}")]
    NotBound(Url),

    /// `Crawler::bind` was called while already bound.
    #[error("already bound")]
    AlreadyBound,

    /// A sitemap document failed top-level validation (wrong namespace,
    /// unparsable XML, or an unrecognized root element).
    #[error("invalid sitemap: {0}")]
    InvalidSitemap(String),

    /// A `robots.txt` document could not be parsed.
    #[error("failed to parse robots.txt: {0}")]
    InvalidRobots(String),

    /// A `Config` value (or one of its sections) was given an out-of-range
    /// or otherwise invalid setting.
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, EthicrawlError>;
