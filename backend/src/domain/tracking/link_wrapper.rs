//! Rewriting newsletter links so clicks flow through tracking redirects.

use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::TrackingId;
use crate::domain::NewsletterBlock;

static HREF_RE: OnceLock<Regex> = OnceLock::new();
static HTTP_URL_RE: OnceLock<Regex> = OnceLock::new();

fn href_regex() -> &'static Regex {
    HREF_RE.get_or_init(|| {
        Regex::new(r#"(?i)href=["'](https?://[^"']+)["']"#)
            .unwrap_or_else(|error| panic!("href regex failed to compile: {error}"))
    })
}

fn http_url_regex() -> &'static Regex {
    HTTP_URL_RE.get_or_init(|| {
        Regex::new(r"(?i)^https?://")
            .unwrap_or_else(|error| panic!("http url regex failed to compile: {error}"))
    })
}

/// Public redirect URL for a tracking id.
///
/// # Examples
/// ```
/// use clinic_newsletter::domain::{TrackingId, tracking_url};
///
/// let id = TrackingId::new("abc").unwrap();
/// assert_eq!(tracking_url("https://t.example/", &id), "https://t.example/t/abc");
/// ```
pub fn tracking_url(base: &str, id: &TrackingId) -> String {
    format!("{}/t/{id}", base.trim_end_matches('/'))
}

/// Unique absolute `http(s)` hrefs in `html`, in first-seen order.
pub fn extract_urls_from_html(html: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    href_regex()
        .captures_iter(html)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim().to_owned()))
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// Replace every href whose URL appears in `mapping` with its tracking URL.
pub fn replace_urls_in_html(
    html: &str,
    mapping: &BTreeMap<String, TrackingId>,
    base: &str,
) -> String {
    href_regex()
        .replace_all(html, |caps: &Captures<'_>| {
            let original = caps.get(0).map_or("", |m| m.as_str());
            let url = caps.get(1).map_or("", |m| m.as_str().trim());
            match mapping.get(url) {
                Some(id) => format!("href=\"{}\"", tracking_url(base, id)),
                None => original.to_owned(),
            }
        })
        .into_owned()
}

/// Unique `http(s)` URLs referenced by newsletter blocks.
pub fn extract_urls_from_blocks(blocks: &[NewsletterBlock]) -> Vec<String> {
    let mut seen = HashSet::new();
    blocks
        .iter()
        .filter_map(NewsletterBlock::url)
        .filter(|url| http_url_regex().is_match(url))
        .map(str::to_owned)
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn id(raw: &str) -> TrackingId {
        TrackingId::new(raw).expect("valid id")
    }

    #[rstest]
    fn extracts_unique_http_hrefs() {
        let html = r#"<a href="https://a.example/x">A</a>
            <a HREF='http://b.example'>B</a>
            <a href="https://a.example/x">again</a>
            <a href="mailto:clinic@example.com">mail</a>"#;
        assert_eq!(
            extract_urls_from_html(html),
            ["https://a.example/x", "http://b.example"]
        );
    }

    #[rstest]
    fn rewrites_only_mapped_hrefs() {
        let html = r#"<a href="https://a.example/x">A</a><a href='https://b.example'>B</a>"#;
        let mapping = BTreeMap::from([("https://a.example/x".to_owned(), id("t1"))]);
        let out = replace_urls_in_html(html, &mapping, "https://t.example");
        assert_eq!(
            out,
            r#"<a href="https://t.example/t/t1">A</a><a href='https://b.example'>B</a>"#
        );
    }

    #[rstest]
    fn block_urls_keep_http_only_and_dedupe() {
        let blocks = vec![
            NewsletterBlock::Text {
                id: "b1".to_owned(),
                content: "hello".to_owned(),
            },
            NewsletterBlock::Image {
                id: "b2".to_owned(),
                url: "https://cdn.example/a.png".to_owned(),
                alt: None,
            },
            NewsletterBlock::BookingButton {
                id: "b3".to_owned(),
                label: "Book".to_owned(),
                url: "https://cdn.example/a.png".to_owned(),
            },
            NewsletterBlock::BookingButton {
                id: "b4".to_owned(),
                label: "Call".to_owned(),
                url: "tel:123".to_owned(),
            },
            NewsletterBlock::Yijing {
                id: "b5".to_owned(),
                title: None,
                description: None,
            },
        ];
        assert_eq!(extract_urls_from_blocks(&blocks), ["https://cdn.example/a.png"]);
    }
}
