use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static URL_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<url\b[^>]*>(.*?)</url>").expect("invalid sitemap url regex")
});
static SITEMAP_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<sitemap\b[^>]*>(.*?)</sitemap>").expect("invalid sitemap index regex")
});
static LOC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<loc>\s*(.*?)\s*</loc>").expect("invalid loc regex"));
static LASTMOD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<lastmod>").expect("invalid lastmod regex"));

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SitemapKind {
    UrlSet, // Single sitemap with URLs
    Index,  // Sitemap index pointing to other sitemaps
}

/// Shape of a sitemap document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SitemapSummary {
    pub kind: SitemapKind,
    /// `<url>` entries, or nested sitemaps for an index
    pub entry_count: usize,
    pub entries_with_lastmod: usize,
    pub first_loc: Option<String>,
}

/// Parse XML sitemap content.
///
/// Returns `None` when the document is neither a `<urlset>` nor a
/// `<sitemapindex>`, e.g. an HTML error page served with status 200.
pub fn parse_sitemap(content: &str) -> Option<SitemapSummary> {
    let (kind, pattern) = if content.contains("<sitemapindex") {
        (SitemapKind::Index, &*SITEMAP_ENTRY)
    } else if content.contains("<urlset") {
        (SitemapKind::UrlSet, &*URL_ENTRY)
    } else {
        return None;
    };

    let mut summary = SitemapSummary {
        kind,
        entry_count: 0,
        entries_with_lastmod: 0,
        first_loc: None,
    };

    for cap in pattern.captures_iter(content) {
        let Some(entry) = cap.get(1).map(|m| m.as_str()) else {
            continue;
        };
        summary.entry_count += 1;
        if LASTMOD.is_match(entry) {
            summary.entries_with_lastmod += 1;
        }
        if summary.first_loc.is_none() {
            summary.first_loc = LOC
                .captures(entry)
                .and_then(|loc| loc.get(1))
                .map(|loc| decode_xml_entities(loc.as_str()));
        }
    }

    Some(summary)
}

fn decode_xml_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
