//! `RobotsPolicy`: parses `robots.txt` and answers "may user-agent U fetch
//! URL X?", using standard group-selection and longest-match rules,
//! evaluated fresh against an arbitrary user-agent at query time rather
//! than being compiled for one fixed agent up front.

mod parser;

use regex::Regex;

use crate::error::{EthicrawlError, Result};
use crate::logger::Logger;
use crate::resource::Response;
use crate::sitemap::IndexEntry;
use crate::url::Url;

use parser::{compile_rule, robots_txt_parse, Line};

#[derive(Clone)]
enum OwnedLine {
    UserAgent(Vec<u8>),
    Allow(Vec<u8>),
    Disallow(Vec<u8>),
    CrawlDelay(Option<u32>),
}

/// A parsed, immutable `robots.txt` policy for one origin.
pub struct RobotsPolicy {
    origin_base: Url,
    lines: Vec<OwnedLine>,
    declared_sitemaps: Vec<IndexEntry>,
    crawl_delay: Option<u32>,
    logger: Logger,
}

impl RobotsPolicy {
    /// Build the policy from the HTTP response to `GET {origin.base}/robots.txt`.
    ///
    /// - 200: parse the body.
    /// - 404: fail open (empty policy, allow all).
    /// - anything else: fail closed (`User-agent: *\nDisallow: /`).
    pub fn from_response(origin_base: Url, response: Option<&Response>, logger: Logger) -> Result<Self> {
        match response {
            Some(r) if r.status == 200 => {
                logger.info(format!("robots.txt for {origin_base}: 200, using declared rules"));
                Self::from_bytes(origin_base, r.content.as_slice(), logger)
            }
            Some(r) if r.status == 404 => {
                logger.info(format!("robots.txt for {origin_base}: 404, allowing all"));
                Self::from_bytes(origin_base, b"", logger)
            }
            Some(r) => {
                logger.warn(format!(
                    "robots.txt for {origin_base}: {}, denying all",
                    r.status
                ));
                Self::from_bytes(origin_base, b"User-agent: *\nDisallow: /", logger)
            }
            None => {
                logger.warn(format!("robots.txt for {origin_base}: transport error, denying all"));
                Self::from_bytes(origin_base, b"User-agent: *\nDisallow: /", logger)
            }
        }
    }

    pub fn from_bytes(origin_base: Url, body: &[u8], logger: Logger) -> Result<Self> {
        let body: Vec<u8> = body.iter().map(|&b| if b == 0 { b'\n' } else { b }).collect();
        let (_, raw_lines) = robots_txt_parse(&body)
            .map_err(|e| EthicrawlError::InvalidRobots(e.to_string()))?;

        let mut declared_sitemaps = Vec::new();
        let mut lines = Vec::new();
        for line in &raw_lines {
            match line {
                Line::Sitemap(url) => {
                    if let Ok(s) = std::str::from_utf8(url) {
                        if let Ok(parsed) = Url::parse(s, false) {
                            declared_sitemaps.push(IndexEntry::new(parsed, None));
                        }
                    }
                }
                Line::UserAgent(ua) => lines.push(OwnedLine::UserAgent(ua.to_vec())),
                Line::Allow(a) => lines.push(OwnedLine::Allow(a.to_vec())),
                Line::Disallow(a) => lines.push(OwnedLine::Disallow(a.to_vec())),
                Line::CrawlDelay(d) => lines.push(OwnedLine::CrawlDelay(*d)),
                Line::Raw(_) => {}
            }
        }

        let crawl_delay = Self::select_group("*", &lines).1;

        Ok(RobotsPolicy {
            origin_base,
            lines,
            declared_sitemaps,
            crawl_delay,
            logger,
        })
    }

    pub fn origin_base(&self) -> &Url {
        &self.origin_base
    }

    /// `Sitemap:` directives declared in `robots.txt`, in document order
    /// (may contain duplicates).
    pub fn declared_sitemaps(&self) -> &[IndexEntry] {
        &self.declared_sitemaps
    }

    /// The `Crawl-Delay` directive applicable to `*`, if any. Informational
    /// only: the core's `RateLimiter` is authoritative over pacing.
    pub fn crawl_delay(&self) -> Option<u32> {
        self.crawl_delay
    }

    /// Select the lines applicable to `agent`, and that group's
    /// `Crawl-Delay`: case-insensitive match on the agent token, falling
    /// back to `*` when the agent isn't explicitly referenced.
    fn select_group(agent: &str, lines: &[OwnedLine]) -> (Vec<OwnedLine>, Option<u32>) {
        let mut agent = agent.to_lowercase();

        let references_agent = lines.iter().any(|l| match l {
            OwnedLine::UserAgent(ua) => agent.as_bytes() == ua.to_ascii_lowercase(),
            _ => false,
        });
        if !references_agent {
            agent = "*".to_string();
        }

        let mut capturing = lines.iter().all(|l| !matches!(l, OwnedLine::UserAgent(_)));
        let mut subset = Vec::new();
        let mut idx = 0usize;
        while idx < lines.len() {
            let mut line = &lines[idx];
            if matches!(line, OwnedLine::UserAgent(_)) {
                capturing = false;
            }
            while idx < lines.len() && matches!(line, OwnedLine::UserAgent(_)) {
                if let OwnedLine::UserAgent(ua) = line {
                    if agent.as_bytes() == ua.to_ascii_lowercase() {
                        capturing = true;
                    }
                }
                idx += 1;
                if idx == lines.len() {
                    break;
                }
                line = &lines[idx];
            }
            if capturing {
                subset.push(line.clone());
            }
            idx += 1;
        }

        let mut delay = subset.iter().find_map(|l| match l {
            OwnedLine::CrawlDelay(Some(d)) => Some(*d),
            _ => None,
        });
        if delay.is_none() {
            for line in lines {
                if let OwnedLine::CrawlDelay(Some(d)) = line {
                    delay = Some(*d);
                }
                if matches!(line, OwnedLine::UserAgent(_)) {
                    break;
                }
            }
        }

        (subset, delay)
    }

    fn compiled_rules(subset: &[OwnedLine]) -> Vec<(isize, bool, Regex)> {
        let mut rules = Vec::new();
        for line in subset {
            let (is_allowed, pattern) = match line {
                OwnedLine::Allow(p) => (true, p),
                OwnedLine::Disallow(p) => (false, p),
                _ => continue,
            };
            let Ok(pattern_str) = std::str::from_utf8(pattern) else {
                continue;
            };
            if let Ok(regex) = compile_rule(pattern_str) {
                rules.push((pattern.len() as isize, is_allowed, regex));
            }
        }
        rules
    }

    fn path_and_query(url: &Url) -> String {
        if let Ok(query) = url.query() {
            if query.is_empty() {
                url.path().to_string()
            } else {
                let qs: Vec<String> = query.iter().map(|(k, v)| format!("{k}={v}")).collect();
                format!("{}?{}", url.path(), qs.join("&"))
            }
        } else {
            url.path().to_string()
        }
    }

    /// Answer whether `effective_user_agent` may fetch `url`.
    ///
    /// Returns `Ok(())` on allow, [`EthicrawlError::Disallowed`] on deny —
    /// a caller cannot silently ignore a denial the way a boolean return
    /// would let them.
    pub fn can_fetch(&self, url: &Url, effective_user_agent: &str) -> Result<()> {
        let path = Self::path_and_query(url);
        if path == "/robots.txt" {
            return Ok(());
        }

        let (subset, _) = Self::select_group(effective_user_agent, &self.lines);
        let rules = Self::compiled_rules(&subset);

        let mut matches: Vec<&(isize, bool, Regex)> =
            rules.iter().filter(|(_, _, re)| re.is_match(&path)).collect();
        matches.sort_by_key(|(len, allowed, _)| (-len, !allowed));

        let allowed = matches.first().map(|(_, a, _)| *a).unwrap_or(true);

        if allowed {
            self.logger.debug(format!("permission check for {url}: allowed"));
            Ok(())
        } else {
            self.logger.warn(format!("permission check for {url}: denied"));
            Err(EthicrawlError::Disallowed {
                url: url.clone(),
                user_agent: effective_user_agent.to_string(),
            })
        }
    }
}
