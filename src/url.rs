use std::collections::BTreeMap;
use std::fmt;
use std::net::ToSocketAddrs;

use crate::error::{EthicrawlError, Result};

/// Schemes this crate is willing to hold an opinion about: exactly `file`,
/// `http`, and `https`. Anything else is rejected at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scheme {
    Http,
    Https,
    File,
}

impl Scheme {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "http" => Some(Scheme::Http),
            "https" => Some(Scheme::Https),
            "file" => Some(Scheme::File),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
            Scheme::File => "file",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed, validated URL restricted to the `http`, `https`, and `file`
/// schemes.
///
/// Structural correctness (non-empty authority for http(s), non-empty path
/// for file) is enforced once here, at construction, so every downstream
/// component can treat a `Url` as trusted input.
#[derive(Debug, Clone)]
pub struct Url {
    inner: url::Url,
    scheme: Scheme,
}

impl Url {
    /// Parse `s` into a `Url`, rejecting unsupported schemes.
    ///
    /// When `validate` is set, the hostname of an http(s) URL is resolved
    /// via DNS; failure to resolve is surfaced as
    /// [`EthicrawlError::UnresolvableHost`].
    pub fn parse(s: &str, validate: bool) -> Result<Self> {
        let inner = url::Url::parse(s).map_err(|e| EthicrawlError::InvalidUrl(format!("{s}: {e}")))?;
        let scheme = Scheme::parse(inner.scheme())
            .ok_or_else(|| EthicrawlError::InvalidUrl(format!("unsupported scheme: {}", inner.scheme())))?;

        match scheme {
            Scheme::Http | Scheme::Https => {
                if inner.host_str().unwrap_or("").is_empty() {
                    return Err(EthicrawlError::InvalidUrl(format!(
                        "missing authority: {s}"
                    )));
                }
            }
            Scheme::File => {
                if inner.path().is_empty() {
                    return Err(EthicrawlError::InvalidUrl(format!("missing path: {s}")));
                }
            }
        }

        let url = Url { inner, scheme };

        if validate && matches!(scheme, Scheme::Http | Scheme::Https) {
            url.resolve_host()?;
        }

        Ok(url)
    }

    fn resolve_host(&self) -> Result<()> {
        let authority = self.authority()?;
        // `ToSocketAddrs` requires a port; http(s) defaults cover the common case.
        let lookup = if self.inner.port().is_some() {
            authority.to_string()
        } else {
            format!("{authority}:80")
        };
        lookup
            .to_socket_addrs()
            .map_err(|_| EthicrawlError::UnresolvableHost(authority.to_string()))?
            .next()
            .ok_or_else(|| EthicrawlError::UnresolvableHost(authority.to_string()))?;
        Ok(())
    }

    /// `scheme://authority` for http(s); the literal string `"file://"` for
    /// file URLs.
    pub fn base(&self) -> String {
        match self.scheme {
            Scheme::File => "file://".to_string(),
            Scheme::Http | Scheme::Https => {
                format!("{}://{}", self.scheme, self.authority().unwrap())
            }
        }
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// `host[:port]`. Fails with [`EthicrawlError::InvalidOperation`] on a
    /// `file` URL, matching the source's `@http_only` decorator.
    pub fn authority(&self) -> Result<String> {
        self.require_http("authority")?;
        let host = self.inner.host_str().unwrap_or_default();
        Ok(match self.inner.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        })
    }

    pub fn path(&self) -> &str {
        self.inner.path()
    }

    /// Ordered query key→value pairs. http(s) only.
    pub fn query(&self) -> Result<Vec<(String, String)>> {
        self.require_http("query")?;
        Ok(self
            .inner
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect())
    }

    /// Fragment text, if any. http(s) only.
    pub fn fragment(&self) -> Result<Option<String>> {
        self.require_http("fragment")?;
        Ok(self.inner.fragment().map(|s| s.to_string()))
    }

    fn require_http(&self, what: &str) -> Result<()> {
        match self.scheme {
            Scheme::Http | Scheme::Https => Ok(()),
            Scheme::File => Err(EthicrawlError::InvalidOperation(format!(
                "{what} is not available on file:// URLs"
            ))),
        }
    }

    /// Join a path segment onto this URL.
    ///
    /// A leading `/` on `segment` replaces a trailing `/` on the existing
    /// path (absolute join); otherwise a separator is inserted if missing.
    pub fn extend_path(&self, segment: &str) -> Result<Self> {
        match self.scheme {
            Scheme::File => {
                let joined = if let Some(stripped) = segment.strip_prefix('/') {
                    format!("/{stripped}")
                } else {
                    let mut current = self.path().to_string();
                    if !current.is_empty() && !current.ends_with('/') {
                        current.push('/');
                    }
                    format!("{current}{segment}")
                };
                Url::parse(&format!("file://{joined}"), false)
            }
            Scheme::Http | Scheme::Https => {
                let authority = self.authority()?;
                let joined = if let Some(stripped) = segment.strip_prefix('/') {
                    format!("/{stripped}")
                } else {
                    let mut current = self.path().to_string();
                    if !current.is_empty() && !current.ends_with('/') {
                        current.push('/');
                    }
                    format!("{current}{segment}")
                };
                Url::parse(&format!("{}://{authority}{joined}", self.scheme), false)
            }
        }
    }

    /// Merge `params` into the query string. Fails with
    /// [`EthicrawlError::InvalidOperation`] on a `file` URL.
    pub fn extend_query(&self, params: &[(&str, &str)]) -> Result<Self> {
        self.require_http("query")?;
        let mut merged: BTreeMap<String, String> = self
            .query()?
            .into_iter()
            .collect();
        for (k, v) in params {
            merged.insert((*k).to_string(), (*v).to_string());
        }

        let mut inner = self.inner.clone();
        {
            let mut pairs = inner.query_pairs_mut();
            pairs.clear();
            for (k, v) in &merged {
                pairs.append_pair(k, v);
            }
        }
        Ok(Url {
            inner,
            scheme: self.scheme,
        })
    }

    /// Merge a single key/value pair into the query string.
    pub fn extend_query_kv(&self, key: &str, value: &str) -> Result<Self> {
        self.extend_query(&[(key, value)])
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.inner.as_str())
    }
}

impl PartialEq for Url {
    fn eq(&self, other: &Self) -> bool {
        self.inner.as_str() == other.inner.as_str()
    }
}
impl Eq for Url {}

impl std::hash::Hash for Url {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.inner.as_str().hash(state);
    }
}

impl std::str::FromStr for Url {
    type Err = EthicrawlError;
    fn from_str(s: &str) -> Result<Self> {
        Url::parse(s, false)
    }
}
