//! HTML inspection helpers used by the page checks
//!
//! Every helper tolerates malformed markup: scraper always produces a tree,
//! and a missing element simply yields `None` or an empty list.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value as JsonValue;
use std::collections::BTreeSet;

static TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("invalid title selector"));
static META: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta").expect("invalid meta selector"));
static LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("link[rel]").expect("invalid link selector"));
static H1: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").expect("invalid h1 selector"));
static IMG: Lazy<Selector> = Lazy::new(|| Selector::parse("img").expect("invalid img selector"));
static SCRIPT: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script").expect("invalid script selector"));

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of the first `<title>`, if non-empty
pub fn document_title(document: &Html) -> Option<String> {
    document
        .select(&TITLE)
        .next()
        .map(element_text)
        .filter(|title| !title.is_empty())
}

/// Non-empty `content` values of `<meta>` tags whose `attr` equals `value`
/// (case-insensitive), e.g. `("name", "description")` or `("property", "og:title")`.
pub fn meta_contents(document: &Html, attr: &str, value: &str) -> Vec<String> {
    document
        .select(&META)
        .filter(|element| {
            element
                .value()
                .attr(attr)
                .is_some_and(|found| found.trim().eq_ignore_ascii_case(value))
        })
        .filter_map(|element| element.value().attr("content"))
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .collect()
}

/// First non-empty `content` for a meta tag
pub fn meta_content(document: &Html, attr: &str, value: &str) -> Option<String> {
    meta_contents(document, attr, value).into_iter().next()
}

/// `(name, content)` pairs for every named meta tag
pub fn named_meta_tags(document: &Html) -> Vec<(String, String)> {
    document
        .select(&META)
        .filter_map(|element| {
            let name = element.value().attr("name")?.trim().to_ascii_lowercase();
            let content = element.value().attr("content")?.trim().to_string();
            Some((name, content))
        })
        .collect()
}

/// First non-empty `href` of a `<link>` whose `rel` list contains `rel_token`
pub fn link_href(document: &Html, rel_token: &str) -> Option<String> {
    document
        .select(&LINK)
        .filter(|element| {
            element.value().attr("rel").is_some_and(|rel| {
                rel.split_whitespace()
                    .any(|token| token.eq_ignore_ascii_case(rel_token))
            })
        })
        .filter_map(|element| element.value().attr("href"))
        .map(|href| href.trim().to_string())
        .find(|href| !href.is_empty())
}

/// Text of the first `<h1>` that has any
pub fn first_h1(document: &Html) -> Option<String> {
    document
        .select(&H1)
        .map(element_text)
        .find(|text| !text.is_empty())
}

/// Image alt text coverage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImageAltStats {
    pub total_images: usize,
    pub images_with_alt: usize,
}

impl ImageAltStats {
    pub fn images_missing_alt(&self) -> usize {
        self.total_images.saturating_sub(self.images_with_alt)
    }
}

/// Count images and those carrying a non-empty `alt`
pub fn image_alt_stats(document: &Html) -> ImageAltStats {
    let mut stats = ImageAltStats::default();
    for image in document.select(&IMG) {
        stats.total_images += 1;
        if image
            .value()
            .attr("alt")
            .is_some_and(|alt| !alt.trim().is_empty())
        {
            stats.images_with_alt += 1;
        }
    }
    stats
}

/// Extract JSON-LD script blocks from a parsed document
pub fn json_ld_blocks(document: &Html) -> Vec<String> {
    document
        .select(&SCRIPT)
        .filter_map(|element| {
            let script_type = element
                .value()
                .attr("type")
                .map(|t| t.trim().to_ascii_lowercase())
                .unwrap_or_default();

            // Use contains() to catch variations like "application/ld+json; charset=utf-8"
            if script_type.contains("ld+json") {
                let text = element.text().collect::<String>().trim().to_string();
                if text.is_empty() { None } else { Some(text) }
            } else {
                None
            }
        })
        .collect()
}

/// Schema.org types declared across JSON-LD blocks, sorted and deduplicated.
///
/// Blocks that fail to parse are skipped.
pub fn json_ld_types(blocks: &[String]) -> Vec<String> {
    let mut types = BTreeSet::new();
    for block in blocks {
        if let Ok(parsed) = serde_json::from_str::<JsonValue>(block) {
            collect_types(&parsed, &mut types);
        }
    }
    types.into_iter().collect()
}

fn collect_types(value: &JsonValue, types: &mut BTreeSet<String>) {
    match value {
        JsonValue::Array(items) => {
            for item in items {
                collect_types(item, types);
            }
        }
        JsonValue::Object(map) => {
            match map.get("@type") {
                Some(JsonValue::String(name)) => {
                    types.insert(shorten_type(name));
                }
                Some(JsonValue::Array(names)) => {
                    for name in names.iter().filter_map(JsonValue::as_str) {
                        types.insert(shorten_type(name));
                    }
                }
                _ => {}
            }
            if let Some(graph) = map.get("@graph") {
                collect_types(graph, types);
            }
        }
        _ => {}
    }
}

fn shorten_type(name: &str) -> String {
    name.rsplit(['/', '#']).next().unwrap_or(name).to_string()
}
