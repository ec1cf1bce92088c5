use std::time::Duration;

use crate::error::{EthicrawlError, Result};
use crate::headers::Headers;
use crate::url::Url;

/// A `Url` plus identity. Equality and hashing are defined on the
/// normalized URL string, so a `Resource` can be used as a cache key or a
/// visited-set member throughout the crate.
#[derive(Debug, Clone)]
pub struct Resource {
    pub url: Url,
}

impl Resource {
    pub fn new(url: Url) -> Self {
        Resource { url }
    }
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.url.to_string() == other.url.to_string()
    }
}
impl Eq for Resource {}

impl std::hash::Hash for Resource {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.url.to_string().hash(state);
    }
}

impl From<Url> for Resource {
    fn from(url: Url) -> Self {
        Resource::new(url)
    }
}

/// An outbound HTTP request: a [`Resource`] plus a timeout and headers.
#[derive(Debug, Clone)]
pub struct Request {
    pub resource: Resource,
    pub timeout: Duration,
    pub headers: Headers,
}

impl Request {
    /// Construct a request. `timeout` must be strictly positive.
    pub fn new(resource: Resource, timeout: Duration, headers: Headers) -> Result<Self> {
        if timeout.is_zero() {
            return Err(EthicrawlError::Config(
                "request timeout must be greater than zero".to_string(),
            ));
        }
        Ok(Request {
            resource,
            timeout,
            headers,
        })
    }

    pub fn url(&self) -> &Url {
        &self.resource.url
    }
}

/// The outcome of a [`Request`].
#[derive(Debug, Clone)]
pub struct Response {
    pub request: Request,
    pub status: u16,
    pub headers: Headers,
    pub content: Vec<u8>,
}

impl Response {
    /// Construct a response, validating the status code is a plausible
    /// HTTP status (100..=599).
    pub fn new(
        request: Request,
        status: u16,
        headers: Headers,
        content: Vec<u8>,
    ) -> Result<Self> {
        if !(100..=599).contains(&status) {
            return Err(EthicrawlError::Config(format!(
                "invalid HTTP status code: {status}"
            )));
        }
        Ok(Response {
            request,
            status,
            headers,
            content,
        })
    }

    pub fn url(&self) -> &Url {
        self.request.url()
    }

    /// Body decoded as UTF-8, replacing invalid sequences (matches the
    /// common-case behavior of the ecosystem's HTTP clients rather than
    /// failing the whole response on a stray invalid byte).
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }
}
