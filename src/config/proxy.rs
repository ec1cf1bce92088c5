use crate::error::Result;
use crate::url::Url;

/// Proxy configuration for the outbound HTTP client.
///
/// Both fields are optional, and a non-`None` value must be a valid `Url`.
#[derive(Debug, Clone, Default)]
pub struct HttpProxyConfig {
    http: Option<Url>,
    https: Option<Url>,
}

impl HttpProxyConfig {
    pub fn http(&self) -> Option<&Url> {
        self.http.as_ref()
    }

    pub fn https(&self) -> Option<&Url> {
        self.https.as_ref()
    }

    pub fn set_http(&mut self, url: Option<Url>) {
        self.http = url;
    }

    pub fn set_https(&mut self, url: Option<Url>) {
        self.https = url;
    }

    /// Build a proxy config from raw strings, validating each as a `Url`.
    pub fn from_strs(http: Option<&str>, https: Option<&str>) -> Result<Self> {
        let mut cfg = HttpProxyConfig::default();
        if let Some(s) = http {
            cfg.set_http(Some(Url::parse(s, true)?));
        }
        if let Some(s) = https {
            cfg.set_https(Some(Url::parse(s, true)?));
        }
        Ok(cfg)
    }
}
