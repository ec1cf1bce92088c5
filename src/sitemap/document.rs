//! Parsed, validated sitemap XML documents.
//!
//! Includes a bare-ampersand preprocessing pass, namespace-strict root
//! validation, and a "skip the entry, keep the document" tolerance for
//! malformed individual `<url>`/`<sitemap>` children. XML parsing itself is
//! done with `quick-xml`, which never loads a DTD or resolves external
//! entities — there is no opt-in to turn either on, so entity-expansion
//! and external-reference attacks are ruled out by construction.

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Reader;

use crate::error::{EthicrawlError, Result};
use crate::logger::Logger;
use crate::url::Url;

use super::entry::{IndexEntry, UrlsetEntry};

const SITEMAP_NS: &[u8] = b"http://www.sitemaps.org/schemas/sitemap/0.9";
const MAX_DEPTH: usize = 12;

/// A parsed `sitemapindex` or `urlset` document.
pub enum SitemapDocument {
    IndexNode { entries: Vec<IndexEntry> },
    UrlsetNode { entries: Vec<UrlsetEntry> },
}

#[derive(Default)]
struct RawEntry {
    loc: Option<String>,
    lastmod: Option<String>,
    changefreq: Option<String>,
    priority: Option<String>,
}

fn local_name_start(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.name().local_name().as_ref()).into_owned()
}

fn local_name_end(e: &BytesEnd) -> String {
    String::from_utf8_lossy(e.name().local_name().as_ref()).into_owned()
}

fn has_sitemap_namespace(e: &BytesStart) -> bool {
    e.attributes().flatten().any(|a| {
        a.key.as_ref() == b"xmlns" && a.value.as_ref() == SITEMAP_NS
    })
}

/// Escape every `&` not already part of a well-formed entity reference
/// (`&name;`, `&#123;`, `&#x1F;`). Many real sitemaps in the wild emit raw
/// `&` in query strings, which is invalid XML but near-universally
/// tolerated by crawlers.
fn escape_bare_ampersands(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        let b = input[i];
        if b == b'&' && !is_valid_entity_at(input, i) {
            out.extend_from_slice(b"&amp;");
        } else {
            out.push(b);
        }
        i += 1;
    }
    out
}

fn is_valid_entity_at(input: &[u8], amp_idx: usize) -> bool {
    let rest = &input[amp_idx + 1..];
    let Some(end) = rest
        .iter()
        .position(|&c| c == b';' || c == b'&' || c.is_ascii_whitespace())
    else {
        return false;
    };
    if rest.get(end) != Some(&b';') {
        return false;
    }
    let body = &rest[..end];
    if body.is_empty() {
        return false;
    }
    if body[0] == b'#' {
        if body.len() > 2 && (body[1] == b'x' || body[1] == b'X') {
            body[2..].iter().all(u8::is_ascii_hexdigit)
        } else {
            body.len() > 1 && body[1..].iter().all(u8::is_ascii_digit)
        }
    } else {
        body.iter().all(|c| c.is_ascii_alphanumeric())
    }
}

impl SitemapDocument {
    /// Parse and validate a sitemap document from its raw HTTP body.
    pub fn parse(body: &[u8], logger: &Logger) -> Result<Self> {
        let escaped = escape_bare_ampersands(body);
        let mut reader = Reader::from_reader(escaped.as_slice());
        reader.trim_text(true);

        let mut buf = Vec::new();
        let mut depth = 0usize;
        let mut root_name: Option<String> = None;
        let mut entry_tag: Option<String> = None;
        let mut leaf_tag: Option<String> = None;
        let mut current = RawEntry::default();
        let mut index_entries = Vec::new();
        let mut urlset_entries = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Eof) => break,
                Ok(Event::Start(e)) => {
                    depth += 1;
                    if depth > MAX_DEPTH {
                        return Err(EthicrawlError::InvalidSitemap(
                            "document nesting exceeds the allowed depth".to_string(),
                        ));
                    }
                    let name = local_name_start(&e);
                    if root_name.is_none() {
                        if !has_sitemap_namespace(&e) {
                            return Err(EthicrawlError::InvalidSitemap(format!(
                                "<{name}> is missing the sitemaps.org default namespace"
                            )));
                        }
                        if name != "urlset" && name != "sitemapindex" {
                            return Err(EthicrawlError::InvalidSitemap(format!(
                                "unsupported sitemap root element: {name}"
                            )));
                        }
                        root_name = Some(name);
                    } else if entry_tag.is_none() && (name == "sitemap" || name == "url") {
                        entry_tag = Some(name);
                        current = RawEntry::default();
                    } else {
                        leaf_tag = Some(name);
                    }
                }
                Ok(Event::Text(t)) => {
                    if let Some(tag) = &leaf_tag {
                        let text = t.unescape().map(|c| c.into_owned()).unwrap_or_default();
                        match tag.as_str() {
                            "loc" => current.loc = Some(text),
                            "lastmod" => current.lastmod = Some(text),
                            "changefreq" => current.changefreq = Some(text),
                            "priority" => current.priority = Some(text),
                            _ => {}
                        }
                    }
                }
                Ok(Event::End(e)) => {
                    depth = depth.saturating_sub(1);
                    let name = local_name_end(&e);
                    if entry_tag.as_deref() == Some(name.as_str()) {
                        Self::finish_entry(
                            root_name.as_deref(),
                            &mut current,
                            logger,
                            &mut index_entries,
                            &mut urlset_entries,
                        );
                        entry_tag = None;
                    }
                    leaf_tag = None;
                }
                Err(e) => {
                    return Err(EthicrawlError::InvalidSitemap(format!(
                        "malformed sitemap XML: {e}"
                    )))
                }
                _ => {}
            }
            buf.clear();
        }

        match root_name.as_deref() {
            Some("urlset") => Ok(SitemapDocument::UrlsetNode {
                entries: urlset_entries,
            }),
            Some("sitemapindex") => Ok(SitemapDocument::IndexNode {
                entries: index_entries,
            }),
            _ => Err(EthicrawlError::InvalidSitemap(
                "document has no recognizable root element".to_string(),
            )),
        }
    }

    fn finish_entry(
        root_name: Option<&str>,
        current: &mut RawEntry,
        logger: &Logger,
        index_entries: &mut Vec<IndexEntry>,
        urlset_entries: &mut Vec<UrlsetEntry>,
    ) {
        let Some(loc) = current.loc.take() else {
            logger.warn("sitemap entry missing <loc>, skipping");
            return;
        };
        let url = match Url::parse(&loc, false) {
            Ok(u) => u,
            Err(e) => {
                logger.warn(format!("sitemap entry has invalid <loc> {loc}: {e}"));
                return;
            }
        };
        match root_name {
            Some("sitemapindex") => match IndexEntry::parse(url, current.lastmod.take()) {
                Ok(entry) => index_entries.push(entry),
                Err(e) => logger.warn(format!("skipping invalid sitemap entry: {e}")),
            },
            Some("urlset") => match UrlsetEntry::parse(
                url,
                current.lastmod.take(),
                current.changefreq.take(),
                current.priority.take(),
            ) {
                Ok(entry) => urlset_entries.push(entry),
                Err(e) => logger.warn(format!("skipping invalid url entry: {e}")),
            },
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoggerConfig;

    fn logger() -> Logger {
        Logger::new("sitemap", LoggerConfig::default())
    }

    #[test]
    fn parses_urlset() {
        let xml = br#"<?xml version="1.0"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://example.com/a</loc><changefreq>daily</changefreq><priority>0.8</priority></url>
  <url><loc>https://example.com/b</loc></url>
</urlset>"#;
        let doc = SitemapDocument::parse(xml, &logger()).unwrap();
        match doc {
            SitemapDocument::UrlsetNode { entries } => {
                assert_eq!(entries.len(), 2);
                assert_eq!(entries[0].priority, Some(0.8));
            }
            _ => panic!("expected UrlsetNode"),
        }
    }

    #[test]
    fn parses_sitemapindex() {
        let xml = br#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap><loc>https://example.com/a.xml</loc></sitemap>
</sitemapindex>"#;
        let doc = SitemapDocument::parse(xml, &logger()).unwrap();
        match doc {
            SitemapDocument::IndexNode { entries } => assert_eq!(entries.len(), 1),
            _ => panic!("expected IndexNode"),
        }
    }

    #[test]
    fn rejects_wrong_namespace() {
        let xml = br#"<urlset xmlns="http://example.com/bogus"><url><loc>https://example.com/a</loc></url></urlset>"#;
        assert!(SitemapDocument::parse(xml, &logger()).is_err());
    }

    #[test]
    fn rejects_unsupported_root() {
        let xml = br#"<feed xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"></feed>"#;
        assert!(SitemapDocument::parse(xml, &logger()).is_err());
    }

    #[test]
    fn skips_entry_missing_loc_without_failing_document() {
        let xml = br#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><lastmod>2024-01-01</lastmod></url>
  <url><loc>https://example.com/b</loc></url>
</urlset>"#;
        let doc = SitemapDocument::parse(xml, &logger()).unwrap();
        match doc {
            SitemapDocument::UrlsetNode { entries } => assert_eq!(entries.len(), 1),
            _ => panic!("expected UrlsetNode"),
        }
    }

    #[test]
    fn escapes_bare_ampersands_in_loc() {
        let xml = br#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://example.com/a?x=1&y=2</loc></url>
</urlset>"#;
        let doc = SitemapDocument::parse(xml, &logger()).unwrap();
        match doc {
            SitemapDocument::UrlsetNode { entries } => {
                assert_eq!(entries[0].url.to_string(), "https://example.com/a?x=1&y=2");
            }
            _ => panic!("expected UrlsetNode"),
        }
    }
}
