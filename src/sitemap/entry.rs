//! Typed sitemap entries: `IndexEntry` and `UrlsetEntry`, plus the W3C
//! datetime shapes and `changefreq`/`priority` ranges they validate against.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{EthicrawlError, Result};
use crate::url::Url;

lazy_static! {
    // date-only | seconds-precision (+/- Z) | numeric offset | microseconds
    static ref W3C_DATETIME: Regex = Regex::new(
        r"^\d{4}-\d{2}-\d{2}(T\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})?)?$"
    )
    .unwrap();
}

fn validate_lastmod(lastmod: Option<String>) -> Result<Option<String>> {
    match lastmod {
        None => Ok(None),
        Some(s) if W3C_DATETIME.is_match(&s) => Ok(Some(s)),
        Some(s) => Err(EthicrawlError::InvalidSitemap(format!(
            "lastmod is not a valid W3C datetime: {s}"
        ))),
    }
}

/// An entry in a `<sitemapindex>` document: one child `<sitemap>`.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub url: Url,
    pub lastmod: Option<String>,
}

impl IndexEntry {
    pub fn new(url: Url, lastmod: Option<String>) -> Self {
        IndexEntry { url, lastmod }
    }

    pub(crate) fn parse(url: Url, lastmod: Option<String>) -> Result<Self> {
        Ok(IndexEntry {
            url,
            lastmod: validate_lastmod(lastmod)?,
        })
    }
}

/// How often a page is expected to change, per the sitemaps.org schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeFreq {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl std::str::FromStr for ChangeFreq {
    type Err = EthicrawlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "always" => Ok(ChangeFreq::Always),
            "hourly" => Ok(ChangeFreq::Hourly),
            "daily" => Ok(ChangeFreq::Daily),
            "weekly" => Ok(ChangeFreq::Weekly),
            "monthly" => Ok(ChangeFreq::Monthly),
            "yearly" => Ok(ChangeFreq::Yearly),
            "never" => Ok(ChangeFreq::Never),
            other => Err(EthicrawlError::InvalidSitemap(format!(
                "unrecognized changefreq: {other}"
            ))),
        }
    }
}

/// An entry in a `<urlset>` document: one child `<url>`.
#[derive(Debug, Clone)]
pub struct UrlsetEntry {
    pub url: Url,
    pub lastmod: Option<String>,
    pub changefreq: Option<ChangeFreq>,
    pub priority: Option<f64>,
}

impl UrlsetEntry {
    pub(crate) fn parse(
        url: Url,
        lastmod: Option<String>,
        changefreq: Option<String>,
        priority: Option<String>,
    ) -> Result<Self> {
        let changefreq = changefreq.map(|s| s.parse()).transpose()?;
        let priority = priority
            .map(|s| {
                s.parse::<f64>()
                    .map_err(|_| EthicrawlError::InvalidSitemap(format!("priority is not a number: {s}")))
            })
            .transpose()?;
        if let Some(p) = priority {
            if !(0.0..=1.0).contains(&p) {
                return Err(EthicrawlError::InvalidSitemap(format!(
                    "priority out of range [0.0, 1.0]: {p}"
                )));
            }
        }
        Ok(UrlsetEntry {
            url,
            lastmod: validate_lastmod(lastmod)?,
            changefreq,
            priority,
        })
    }
}
