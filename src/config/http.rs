use crate::config::proxy::HttpProxyConfig;
use crate::error::{EthicrawlError, Result};
use crate::headers::Headers;

/// HTTP client configuration.
///
/// Every setter validates its argument and returns a [`Result`] rather
/// than panicking.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    timeout: f64,
    max_retries: u32,
    retry_delay: f64,
    rate_limit: Option<f64>,
    jitter: f64,
    user_agent: String,
    headers: Headers,
    proxies: HttpProxyConfig,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            timeout: 30.0,
            max_retries: 3,
            retry_delay: 1.0,
            rate_limit: Some(0.5),
            jitter: 0.2,
            user_agent: "Ethicrawl/1.0".to_string(),
            headers: Headers::new(),
            proxies: HttpProxyConfig::default(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> f64 {
        self.timeout
    }

    /// `0 < timeout <= 300`.
    pub fn set_timeout(&mut self, value: f64) -> Result<()> {
        if value <= 0.0 {
            return Err(EthicrawlError::Config("timeout must be positive".to_string()));
        }
        if value > 300.0 {
            return Err(EthicrawlError::Config(
                "maximum timeout is 300 seconds".to_string(),
            ));
        }
        self.timeout = value;
        Ok(())
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// `0 <= max_retries <= 10`.
    pub fn set_max_retries(&mut self, value: u32) -> Result<()> {
        if value > 10 {
            return Err(EthicrawlError::Config(
                "max_retries cannot be more than 10".to_string(),
            ));
        }
        self.max_retries = value;
        Ok(())
    }

    pub fn retry_delay(&self) -> f64 {
        self.retry_delay
    }

    /// `0 <= retry_delay <= 60`.
    pub fn set_retry_delay(&mut self, value: f64) -> Result<()> {
        if !(0.0..=60.0).contains(&value) {
            return Err(EthicrawlError::Config(
                "retry_delay must be between 0 and 60".to_string(),
            ));
        }
        self.retry_delay = value;
        Ok(())
    }

    /// Requests per second; `None` means unlimited.
    pub fn rate_limit(&self) -> Option<f64> {
        self.rate_limit
    }

    /// `rate_limit` must be strictly positive when set.
    pub fn set_rate_limit(&mut self, value: Option<f64>) -> Result<()> {
        if let Some(v) = value {
            if v <= 0.0 {
                return Err(EthicrawlError::Config(
                    "rate_limit must be positive".to_string(),
                ));
            }
        }
        self.rate_limit = value;
        Ok(())
    }

    pub fn jitter(&self) -> f64 {
        self.jitter
    }

    /// `0 <= jitter < 1`.
    pub fn set_jitter(&mut self, value: f64) -> Result<()> {
        if !(0.0..1.0).contains(&value) {
            return Err(EthicrawlError::Config(
                "jitter must be between 0.0 and 1.0".to_string(),
            ));
        }
        self.jitter = value;
        Ok(())
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn set_user_agent(&mut self, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(EthicrawlError::Config("user_agent cannot be empty".to_string()));
        }
        self.user_agent = value;
        Ok(())
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn set_headers(&mut self, headers: Headers) {
        self.headers = headers;
    }

    pub fn proxies(&self) -> &HttpProxyConfig {
        &self.proxies
    }

    pub fn set_proxies(&mut self, proxies: HttpProxyConfig) {
        self.proxies = proxies;
    }

    /// `1 / rate_limit`, or `0` when unlimited — the `RateLimiter`'s
    /// `min_interval`.
    pub fn min_interval_secs(&self) -> f64 {
        match self.rate_limit {
            Some(rl) if rl > 0.0 => 1.0 / rl,
            _ => 0.0,
        }
    }
}
