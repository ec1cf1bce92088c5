//! `robots.txt` grammar.
//!
//! A `nom`-based grammar (`Line`, `robots_txt_parse`, the per-rule regex
//! compilation with a `*`-run collapse and a bounded size limit to resist
//! adversarial patterns) living behind [`super::RobotsPolicy`].

use core::fmt;

use bstr::ByteSlice;
use lazy_static::lazy_static;

use nom::branch::alt;
use nom::bytes::complete::{tag, tag_no_case, take_while};
use nom::character::complete::space0;
use nom::combinator::{eof, opt};
use nom::multi::many_till;
use nom::sequence::preceded;
use nom::IResult;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use regex::{Regex, RegexBuilder};

pub(crate) fn percent_encode(input: &str) -> String {
    const FRAGMENT: &AsciiSet = &CONTROLS.add(b' ').add(b'"').add(b'<').add(b'>').add(b'`');
    utf8_percent_encode(input, FRAGMENT).to_string()
}

#[derive(PartialEq, Eq, Copy, Clone)]
pub(crate) enum Line<'a> {
    UserAgent(&'a [u8]),
    Allow(&'a [u8]),
    Disallow(&'a [u8]),
    Sitemap(&'a [u8]),
    CrawlDelay(Option<u32>),
    Raw(&'a [u8]),
}

#[cfg(not(tarpaulin_include))]
impl fmt::Debug for Line<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Line::UserAgent(ua) => f.debug_tuple("UserAgent").field(&ua.as_bstr()).finish(),
            Line::Allow(a) => f.debug_tuple("Allow").field(&a.as_bstr()).finish(),
            Line::Disallow(a) => f.debug_tuple("Disallow").field(&a.as_bstr()).finish(),
            Line::CrawlDelay(c) => f.debug_tuple("CrawlDelay").field(&c).finish(),
            Line::Sitemap(sm) => f.debug_tuple("Sitemap").field(&sm.as_bstr()).finish(),
            Line::Raw(r) => f.debug_tuple("Raw").field(&r.as_bstr()).finish(),
        }
    }
}

fn is_not_line_ending(c: u8) -> bool {
    c != b'\n' && c != b'\r'
}

fn is_not_line_ending_or_comment(c: u8) -> bool {
    c != b'\n' && c != b'\r' && c != b'#'
}

fn is_carriage_return(c: u8) -> bool {
    c == b'\r'
}

fn consume_newline(input: &[u8]) -> IResult<&[u8], Option<&[u8]>> {
    let (input, _) = take_while(is_carriage_return)(input)?;
    let (input, output) = opt(tag(b"\n"))(input)?;
    Ok((input, output))
}

fn line(input: &[u8]) -> IResult<&[u8], Line> {
    let (input, line) = take_while(is_not_line_ending)(input)?;
    let (input, _) = consume_newline(input)?;
    Ok((input, Line::Raw(line)))
}

fn statement_builder<'a>(input: &'a [u8], target: &str) -> IResult<&'a [u8], &'a [u8]> {
    let (input, _) = preceded(space0, tag_no_case(target))(input)?;
    let (input, _) = preceded(space0, tag(":"))(input)?;
    let (input, line) = take_while(is_not_line_ending_or_comment)(input)?;
    let (input, _) = opt(preceded(tag("#"), take_while(is_not_line_ending)))(input)?;
    let (input, _) = consume_newline(input)?;
    let line = line.trim();
    Ok((input, line))
}

fn user_agent(input: &[u8]) -> IResult<&[u8], Line> {
    let (input, agent) = statement_builder(input, "user-agent")?;
    Ok((input, Line::UserAgent(agent)))
}

fn allow(input: &[u8]) -> IResult<&[u8], Line> {
    let (input, rule) = statement_builder(input, "allow")?;
    Ok((input, Line::Allow(rule)))
}

fn disallow(input: &[u8]) -> IResult<&[u8], Line> {
    let (input, rule) = statement_builder(input, "disallow")?;
    if rule.is_empty() {
        // "Disallow:" is equivalent to allow all.
        return Ok((input, Line::Allow(b"/")));
    }
    Ok((input, Line::Disallow(rule)))
}

fn sitemap(input: &[u8]) -> IResult<&[u8], Line> {
    let (input, url) = statement_builder(input, "sitemap")?;
    Ok((input, Line::Sitemap(url)))
}

fn crawl_delay(input: &[u8]) -> IResult<&[u8], Line> {
    let (input, time) = statement_builder(input, "crawl-delay")?;

    let time = match std::str::from_utf8(time) {
        Ok(time) => time,
        Err(_) => {
            return Err(nom::Err::Error(nom::error::Error {
                input,
                code: nom::error::ErrorKind::Fail,
            }))
        }
    };
    let delay = match time.parse::<u32>() {
        Ok(d) => Some(d),
        Err(_) => {
            return Err(nom::Err::Error(nom::error::Error {
                input,
                code: nom::error::ErrorKind::Digit,
            }))
        }
    };
    Ok((input, Line::CrawlDelay(delay)))
}

pub(crate) fn robots_txt_parse(input: &[u8]) -> IResult<&[u8], Vec<Line>> {
    // Remove BOM ("\xef\xbb\xbf") if present.
    let (input, _) = opt(tag(b"\xef"))(input)?;
    let (input, _) = opt(tag(b"\xbb"))(input)?;
    let (input, _) = opt(tag(b"\xbf"))(input)?;
    let (input, (lines, _)) = many_till(
        alt((user_agent, allow, disallow, sitemap, crawl_delay, line)),
        eof,
    )(input)?;
    Ok((input, lines))
}

/// Compile a single `Allow`/`Disallow` pattern into a bounded regex.
///
/// Collapses runs of `*` into one (adversarial `x***...***y` patterns are
/// equivalent but blow up the naive regex), then escapes everything except
/// `*`/`$` before handing it to the regex engine with a hard size cap.
pub(crate) fn compile_rule(pattern: &str) -> std::result::Result<Regex, regex::Error> {
    let pattern = percent_encode(pattern);

    lazy_static! {
        static ref STARKILLER_REGEX: Regex = Regex::new(r"\*+").unwrap();
    }
    let pattern = STARKILLER_REGEX.replace_all(&pattern, "*");
    let pattern = regex::escape(&pattern).replace("\\*", ".*").replace("\\$", "$");

    RegexBuilder::new(&pattern)
        .dfa_size_limit(42 * (1 << 10))
        .size_limit(42 * (1 << 10))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_basic_directives() {
        let txt = b"User-Agent: FerrisCrawler\nAllow: /ocean\nDisallow: /rust\nCrawl-delay: 10\nSitemap: https://example.com/site.xml\n";
        let (_, lines) = robots_txt_parse(txt).unwrap();
        assert!(lines.iter().any(|l| matches!(l, Line::UserAgent(ua) if *ua == b"FerrisCrawler"[..])));
        assert!(lines.iter().any(|l| matches!(l, Line::CrawlDelay(Some(10)))));
        assert!(lines
            .iter()
            .any(|l| matches!(l, Line::Sitemap(s) if *s == b"https://example.com/site.xml"[..])));
    }

    #[test]
    fn empty_disallow_means_allow_all() {
        let txt = b"User-Agent: *\nDisallow:\n";
        let (_, lines) = robots_txt_parse(txt).unwrap();
        assert!(lines.iter().any(|l| matches!(l, Line::Allow(p) if *p == b"/"[..])));
    }

    #[test]
    fn star_runs_collapse_to_one() {
        let rule = compile_rule("/a***b").unwrap();
        assert_eq!(rule.as_str(), "/a.*b");
    }
}
