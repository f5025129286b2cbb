//! Attribution strings for exported data.
//!
//! Tile sources carry attribution markup that must accompany any export.
//! This mirrors how map engines assemble their attribution control: entries
//! swallowed by a longer entry are dropped, compound entries are split on
//! `|`, and each surviving entry keeps its markup alongside a plain-text
//! form and its extracted links.

use once_cell::sync::Lazy;
use regex::Regex;

static LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)<a\s[^>]*href="([^"]*)"[^>]*>(.*?)</a>"#).unwrap());
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// A link inside an attribution entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributionLink {
    pub href: String,
    pub text: String,
}

/// One attribution entry: original markup plus derived plain text and links
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribution {
    pub html: String,
    pub text: String,
    pub links: Vec<AttributionLink>,
}

/// Collapse raw per-source attribution markup into distinct entries.
///
/// Entries that occur as substrings of another entry are dropped (shortest
/// first, so duplicates collapse to one), the rest are split on `|` and
/// trimmed.
pub fn collect_attributions(raw: &[String]) -> Vec<Attribution> {
    let mut entries: Vec<&str> = raw.iter().map(String::as_str).collect();
    entries.sort_by_key(|entry| entry.len());

    let mut kept: Vec<&str> = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        let swallowed = entries[i + 1..].iter().any(|later| later.contains(*entry));
        if !swallowed {
            kept.push(*entry);
        }
    }

    kept.into_iter()
        .flat_map(|entry| entry.split('|'))
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(parse_entry)
        .collect()
}

fn parse_entry(html: &str) -> Attribution {
    let links = LINK_RE
        .captures_iter(html)
        .map(|caps| AttributionLink {
            href: unescape(&caps[1]),
            text: unescape(&TAG_RE.replace_all(&caps[2], "")),
        })
        .collect();
    let text = unescape(&TAG_RE.replace_all(html, ""));

    Attribution {
        html: html.to_string(),
        text,
        links,
    }
}

/// Decode the five predefined XML entities
fn unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
