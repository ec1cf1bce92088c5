use std::sync::Mutex;
use std::time::Duration;

use crate::config::HttpConfig;
use crate::error::{EthicrawlError, Result};
use crate::headers::Headers;
use crate::resource::{Request, Response};

/// The capability every origin needs to actually move bytes: given a
/// [`Request`], produce a [`Response`].
///
/// Conforming implementations exist for a synchronous HTTP client (shipped
/// here as [`HttpFetcher`]) and, outside this crate, a headless-browser
/// driver — the wire-level transport and the browser-rendering variant are
/// both explicit Non-goals; only the trait boundary they must satisfy
/// lives here.
pub trait Fetcher: Send + Sync {
    fn get(&self, request: &Request) -> Result<Response>;

    /// The user-agent string effectively used for outbound requests.
    fn user_agent(&self) -> String;

    /// Advisory: implementations whose user-agent is fixed (e.g. a
    /// headless browser with a baked-in UA) may log and ignore this. This
    /// is a documented contract, not a bug.
    fn set_user_agent(&self, agent: &str);
}

/// A blocking HTTP `Fetcher` built on `reqwest`, honoring [`HttpConfig`]'s
/// timeout, proxies, default headers, user-agent, and retry settings.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    user_agent: Mutex<String>,
    default_headers: Headers,
    max_retries: u32,
    retry_delay: Duration,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs_f64(config.timeout()));

        if let Some(proxy_url) = config.proxies().http() {
            let proxy = reqwest::Proxy::http(proxy_url.to_string())
                .map_err(|e| EthicrawlError::Config(format!("invalid http proxy: {e}")))?;
            builder = builder.proxy(proxy);
        }
        if let Some(proxy_url) = config.proxies().https() {
            let proxy = reqwest::Proxy::https(proxy_url.to_string())
                .map_err(|e| EthicrawlError::Config(format!("invalid https proxy: {e}")))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| EthicrawlError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(HttpFetcher {
            client,
            user_agent: Mutex::new(config.user_agent().to_string()),
            default_headers: config.headers().clone(),
            max_retries: config.max_retries(),
            retry_delay: Duration::from_secs_f64(config.retry_delay()),
        })
    }

    fn attempt(&self, request: &Request) -> std::result::Result<reqwest::blocking::Response, anyhow::Error> {
        let ua = self.user_agent();
        let merged = request.headers.merged_over(&self.default_headers);

        let mut builder = self
            .client
            .get(request.url().to_string())
            .timeout(request.timeout)
            .header(reqwest::header::USER_AGENT, ua);

        for (k, v) in merged.iter() {
            builder = builder.header(k, v);
        }

        Ok(builder.send()?)
    }
}

impl Fetcher for HttpFetcher {
    fn get(&self, request: &Request) -> Result<Response> {
        let mut last_err = None;
        for attempt in 0..=self.max_retries {
            match self.attempt(request) {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    let mut headers = Headers::new();
                    for (name, value) in resp.headers() {
                        if let Ok(v) = value.to_str() {
                            headers.insert(name.as_str(), v);
                        }
                    }
                    let content = resp
                        .bytes()
                        .map_err(|e| EthicrawlError::TransportError {
                            url: request.url().clone(),
                            source: e.into(),
                        })?
                        .to_vec();
                    return Response::new(request.clone(), status, headers, content);
                }
                Err(e) => {
                    last_err = Some(e);
                    if attempt < self.max_retries {
                        std::thread::sleep(self.retry_delay);
                    }
                }
            }
        }
        Err(EthicrawlError::TransportError {
            url: request.url().clone(),
            source: last_err.unwrap_or_else(|| anyhow::anyhow!("request failed")),
        })
    }

    fn user_agent(&self) -> String {
        self.user_agent.lock().unwrap().clone()
    }

    fn set_user_agent(&self, agent: &str) {
        *self.user_agent.lock().unwrap() = agent.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_default_config() {
        let cfg = HttpConfig::default();
        assert!(HttpFetcher::new(&cfg).is_ok());
    }

    #[test]
    fn user_agent_setter_is_visible_to_getter() {
        let cfg = HttpConfig::default();
        let fetcher = HttpFetcher::new(&cfg).unwrap();
        assert_eq!(fetcher.user_agent(), "Ethicrawl/1.0");
        fetcher.set_user_agent("CustomBot/2.0");
        assert_eq!(fetcher.user_agent(), "CustomBot/2.0");
    }
}
