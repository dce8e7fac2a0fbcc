//! Check evaluation over fetched page artifacts
//!
//! Every criterion is an independent predicate. Missing evidence or a failed
//! fetch produces `passed: false` with a reason, never an error, so the output
//! always holds one result per [`CheckKey`] in canonical order.

use scraper::Html;
use url::Url;

use crate::error::FetchError;
use crate::fetch::FetchedResource;
use crate::parser;
use crate::robots_txt::{self, RobotsTxt};
use crate::sitemap::{self, SitemapKind};
use crate::types::{CheckKey, CheckResult};

/// Directives that keep a page out of indexes
const BLOCKING_DIRECTIVES: &[&str] = &["noindex", "none"];

/// Everything the checks look at for one analysis
#[derive(Debug, Clone)]
pub struct PageArtifacts {
    /// Normalized URL that was requested
    pub url: Url,
    pub page: Result<FetchedResource, FetchError>,
    pub robots_txt: Result<FetchedResource, FetchError>,
    pub sitemap_xml: Result<FetchedResource, FetchError>,
}

struct PageContext<'a> {
    resource: &'a FetchedResource,
    document: Html,
}

enum RobotsState {
    Found(RobotsTxt),
    Missing(String),
}

/// Run every check in canonical order.
pub fn evaluate(artifacts: &PageArtifacts) -> Vec<CheckResult> {
    let page = artifacts.page.as_ref().map(|resource| PageContext {
        resource,
        document: Html::parse_document(&resource.body),
    });
    let robots = robots_state(&artifacts.robots_txt);

    CheckKey::ALL
        .iter()
        .map(|key| evaluate_one(*key, artifacts, &page, &robots))
        .collect()
}

fn evaluate_one(
    key: CheckKey,
    artifacts: &PageArtifacts,
    page: &Result<PageContext<'_>, &FetchError>,
    robots: &RobotsState,
) -> CheckResult {
    match key {
        CheckKey::RobotsTxt => check_robots_txt(robots, &artifacts.url),
        CheckKey::SitemapXml => check_sitemap(&artifacts.sitemap_xml),
        CheckKey::XRobotsTag => with_page(key, page, |page| check_x_robots_tag(page.resource)),
        CheckKey::MetaRobots => with_page(key, page, |page| check_meta_robots(&page.document)),
        CheckKey::Canonical => with_page(key, page, |page| {
            match parser::link_href(&page.document, "canonical") {
                Some(href) => CheckResult::pass(key, format!("Canonical: {}", href)),
                None => CheckResult::fail(key, "Missing <link rel=\"canonical\">"),
            }
        }),
        CheckKey::Title => with_page(key, page, |page| {
            match parser::document_title(&page.document) {
                Some(title) => CheckResult::pass(key, format!("Title: {}", title)),
                None => CheckResult::fail(key, "Missing or empty <title>"),
            }
        }),
        CheckKey::MetaDescription => with_page(key, page, |page| {
            match parser::meta_content(&page.document, "name", "description") {
                Some(description) => CheckResult::pass(
                    key,
                    format!(
                        "Meta description present ({} chars)",
                        description.chars().count()
                    ),
                ),
                None => CheckResult::fail(key, "Missing meta description"),
            }
        }),
        CheckKey::OgTitle => with_page(key, page, |page| {
            match parser::meta_content(&page.document, "property", "og:title") {
                Some(title) => CheckResult::pass(key, format!("og:title: {}", title)),
                None => CheckResult::fail(key, "Missing og:title"),
            }
        }),
        CheckKey::OgDescription => with_page(key, page, |page| {
            match parser::meta_content(&page.document, "property", "og:description") {
                Some(_) => CheckResult::pass(key, "og:description present"),
                None => CheckResult::fail(key, "Missing og:description"),
            }
        }),
        CheckKey::H1 => with_page(key, page, |page| match parser::first_h1(&page.document) {
            Some(heading) => CheckResult::pass(key, format!("H1: {}", heading)),
            None => CheckResult::fail(key, "Missing <h1>"),
        }),
        CheckKey::StructuredData => {
            with_page(key, page, |page| check_structured_data(&page.document))
        }
        CheckKey::AiInstructions => check_ai_instructions(robots),
        CheckKey::ImageAlt => with_page(key, page, |page| check_image_alt(&page.document)),
        CheckKey::Favicon => with_page(key, page, |page| {
            match parser::link_href(&page.document, "icon") {
                Some(href) => CheckResult::pass(key, format!("Favicon link found: {}", href)),
                None => CheckResult::fail(key, "No <link rel=\"icon\"> found"),
            }
        }),
        CheckKey::HttpStatus => check_http_status(&artifacts.page, &artifacts.url),
    }
}

/// Run a page-derived check, or fail it with the fetch error.
fn with_page(
    key: CheckKey,
    page: &Result<PageContext<'_>, &FetchError>,
    check: impl FnOnce(&PageContext<'_>) -> CheckResult,
) -> CheckResult {
    match page {
        Ok(page) => check(page),
        Err(error) => CheckResult::fail(key, format!("Page could not be fetched: {}", error)),
    }
}

fn robots_state(fetched: &Result<FetchedResource, FetchError>) -> RobotsState {
    match fetched {
        Err(error) => RobotsState::Missing(format!("robots.txt unreachable: {}", error)),
        Ok(resource) if !resource.is_success() => {
            RobotsState::Missing(format!("robots.txt returned HTTP {}", resource.status))
        }
        Ok(resource) if robots_txt::looks_like_html(&resource.body) => {
            RobotsState::Missing("robots.txt is served as an HTML page".to_string())
        }
        Ok(resource) => RobotsState::Found(robots_txt::parse_robots_txt(&resource.body)),
    }
}

fn check_robots_txt(robots: &RobotsState, url: &Url) -> CheckResult {
    let key = CheckKey::RobotsTxt;
    let robots = match robots {
        RobotsState::Found(robots) => robots,
        RobotsState::Missing(reason) => return CheckResult::fail(key, reason.clone()),
    };

    let mut notes = vec!["robots.txt is present".to_string()];
    if robots.blocks_everyone() {
        notes.push("warning: all bots blocked with 'Disallow: /'".to_string());
    } else if !robots.is_path_allowed(url.path(), "*") {
        notes.push(format!("warning: {} is disallowed for all bots", url.path()));
    }
    if !robots.sitemaps.is_empty() {
        notes.push(format!("{} sitemap(s) declared", robots.sitemaps.len()));
    }

    CheckResult::pass(key, notes.join("; "))
}

fn check_sitemap(fetched: &Result<FetchedResource, FetchError>) -> CheckResult {
    let key = CheckKey::SitemapXml;
    let resource = match fetched {
        Ok(resource) => resource,
        Err(error) => return CheckResult::fail(key, format!("sitemap.xml unreachable: {}", error)),
    };
    if !resource.is_success() {
        return CheckResult::fail(key, format!("sitemap.xml returned HTTP {}", resource.status));
    }

    match sitemap::parse_sitemap(&resource.body) {
        Some(summary) => {
            let mut description = match summary.kind {
                SitemapKind::UrlSet => format!(
                    "sitemap.xml found ({} URLs, {} with lastmod)",
                    summary.entry_count, summary.entries_with_lastmod
                ),
                SitemapKind::Index => format!(
                    "sitemap index found ({} nested sitemaps, {} with lastmod)",
                    summary.entry_count, summary.entries_with_lastmod
                ),
            };
            if let Some(first) = &summary.first_loc {
                description.push_str(&format!("; first entry: {}", first));
            }
            CheckResult::pass(key, description)
        }
        None => CheckResult::fail(
            key,
            "sitemap.xml is not a valid sitemap (missing <urlset> or <sitemapindex>)",
        ),
    }
}

fn check_ai_instructions(robots: &RobotsState) -> CheckResult {
    let key = CheckKey::AiInstructions;
    let robots = match robots {
        RobotsState::Found(robots) => robots,
        RobotsState::Missing(reason) => {
            return CheckResult::fail(key, format!("No AI directives found ({})", reason));
        }
    };

    let addressed = robots.addressed_ai_crawlers();
    if addressed.is_empty() {
        return CheckResult::fail(key, "robots.txt has no rules for known AI crawlers");
    }

    let statuses = addressed
        .iter()
        .map(|crawler| {
            let access = robots.crawler_access(crawler).as_str();
            match robots.group_for(crawler).and_then(|group| group.crawl_delay) {
                Some(delay) => format!("{}: {}, crawl-delay {}s", crawler, access, delay),
                None => format!("{}: {}", crawler, access),
            }
        })
        .collect::<Vec<_>>();
    CheckResult::pass(key, format!("AI crawler rules found ({})", statuses.join(", ")))
}

fn check_http_status(page: &Result<FetchedResource, FetchError>, requested: &Url) -> CheckResult {
    let key = CheckKey::HttpStatus;
    let resource = match page {
        Ok(resource) => resource,
        Err(error) => return CheckResult::fail(key, format!("Page could not be fetched: {}", error)),
    };

    let redirect_note = if resource.was_redirected(requested) {
        format!(" (redirected to {})", resource.final_url)
    } else {
        String::new()
    };

    if (200..400).contains(&resource.status) {
        CheckResult::pass(key, format!("Status: {}{}", resource.status, redirect_note))
    } else {
        CheckResult::fail(key, format!("Status: {}{}", resource.status, redirect_note))
    }
}

fn blocking_directive(value: &str) -> Option<&'static str> {
    let lowered = value.to_ascii_lowercase();
    BLOCKING_DIRECTIVES.iter().copied().find(|directive| {
        lowered
            .split([',', ' ', ':'])
            .any(|token| token.trim() == *directive)
    })
}

fn check_x_robots_tag(resource: &FetchedResource) -> CheckResult {
    let key = CheckKey::XRobotsTag;
    match resource.header("x-robots-tag") {
        None => CheckResult::pass(key, "No X-Robots-Tag header (OK)"),
        Some(value) => match blocking_directive(value) {
            Some(directive) => CheckResult::fail(
                key,
                format!("X-Robots-Tag blocks indexing ({}): {}", directive, value),
            ),
            None => CheckResult::pass(key, format!("X-Robots-Tag allows indexing: {}", value)),
        },
    }
}

fn check_meta_robots(document: &Html) -> CheckResult {
    let key = CheckKey::MetaRobots;
    let robots_tags = parser::named_meta_tags(document)
        .into_iter()
        .filter(|(name, _)| {
            name == "robots"
                || robots_txt::AI_CRAWLERS
                    .iter()
                    .any(|crawler| crawler.eq_ignore_ascii_case(name))
        })
        .collect::<Vec<_>>();

    if robots_tags.is_empty() {
        return CheckResult::pass(key, "No meta robots (OK)");
    }

    for (name, content) in &robots_tags {
        if let Some(directive) = blocking_directive(content) {
            return CheckResult::fail(
                key,
                format!("<meta name=\"{}\"> blocks indexing ({})", name, directive),
            );
        }
    }

    let contents = robots_tags
        .iter()
        .map(|(_, content)| content.as_str())
        .collect::<Vec<_>>();
    CheckResult::pass(key, format!("Meta robots allows indexing: {}", contents.join("; ")))
}

fn check_structured_data(document: &Html) -> CheckResult {
    let key = CheckKey::StructuredData;
    let blocks = parser::json_ld_blocks(document);
    if blocks.is_empty() {
        return CheckResult::fail(key, "No JSON-LD");
    }

    let types = parser::json_ld_types(&blocks);
    if types.is_empty() {
        CheckResult::pass(key, format!("{} JSON-LD block(s) found", blocks.len()))
    } else {
        CheckResult::pass(
            key,
            format!("{} JSON-LD block(s) found: {}", blocks.len(), types.join(", ")),
        )
    }
}

fn check_image_alt(document: &Html) -> CheckResult {
    let key = CheckKey::ImageAlt;
    let stats = parser::image_alt_stats(document);
    if stats.total_images == 0 {
        return CheckResult::pass(key, "No images on the page (vacuously satisfied)");
    }

    let missing = stats.images_missing_alt();
    if missing == 0 {
        CheckResult::pass(key, format!("All {} images have alt text", stats.total_images))
    } else {
        CheckResult::fail(
            key,
            format!("{} of {} images missing alt text", missing, stats.total_images),
        )
    }
}
