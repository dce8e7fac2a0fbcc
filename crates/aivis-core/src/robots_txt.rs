//! Robots.txt parser and analyzer
//!
//! Parses robots.txt files into user-agent groups and answers access questions
//! for AI crawlers (GPTBot, ClaudeBot, etc.)

use serde::{Deserialize, Serialize};

/// Known AI crawler user agents
pub const AI_CRAWLERS: &[&str] = &[
    "GPTBot",          // OpenAI training
    "ChatGPT-User",    // OpenAI ChatGPT browsing
    "OAI-SearchBot",   // OpenAI search
    "ClaudeBot",       // Anthropic Claude
    "Claude-Web",      // Anthropic Claude web
    "Anthropic-AI",    // Anthropic general
    "Google-Extended", // Google Gemini
    "Applebot-Extended",
    "PerplexityBot",
    "CCBot", // Common Crawl
    "YouBot",
    "Bytespider",
];

/// One group of rules shared by consecutive `User-agent` lines
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentGroup {
    pub user_agents: Vec<String>,
    pub disallow: Vec<String>,
    pub allow: Vec<String>,
    pub crawl_delay: Option<u32>,
}

impl AgentGroup {
    fn names(&self, agent: &str) -> bool {
        self.user_agents
            .iter()
            .any(|name| name.eq_ignore_ascii_case(agent))
    }

    /// `Disallow: /` with no `Allow` carve-outs
    pub fn blocks_all(&self) -> bool {
        self.disallow.iter().any(|path| path == "/") && self.allow.is_empty()
    }
}

/// Parsed robots.txt
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotsTxt {
    pub groups: Vec<AgentGroup>,
    pub sitemaps: Vec<String>,
}

/// Access level for a crawler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    /// Full access to site
    Allowed,

    /// Partially blocked (some paths disallowed)
    Partial,

    /// Fully blocked
    Blocked,

    /// No specific rules and no wildcard restrictions
    Default,
}

impl AccessLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            AccessLevel::Allowed => "allowed",
            AccessLevel::Partial => "partial",
            AccessLevel::Blocked => "blocked",
            AccessLevel::Default => "default",
        }
    }

    fn from_group(group: &AgentGroup) -> Self {
        if group.blocks_all() {
            AccessLevel::Blocked
        } else if !group.disallow.is_empty() {
            AccessLevel::Partial
        } else {
            AccessLevel::Allowed
        }
    }
}

/// Parse robots.txt content
pub fn parse_robots_txt(content: &str) -> RobotsTxt {
    let mut robots = RobotsTxt::default();
    let mut current = AgentGroup::default();
    // A rule line closes the run of user-agent lines that opened the group
    let mut in_rules = false;

    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    for line in content.lines() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let Some((directive, value)) = line.split_once(':') else {
            continue;
        };
        let directive = directive.trim().to_ascii_lowercase();
        let value = value.trim();

        match directive.as_str() {
            "user-agent" => {
                if in_rules {
                    robots.groups.push(std::mem::take(&mut current));
                    in_rules = false;
                }
                if !value.is_empty() {
                    current.user_agents.push(value.to_string());
                }
            }
            "disallow" => {
                in_rules = true;
                if !value.is_empty() {
                    current.disallow.push(value.to_string());
                }
            }
            "allow" => {
                in_rules = true;
                if !value.is_empty() {
                    current.allow.push(value.to_string());
                }
            }
            "crawl-delay" => {
                in_rules = true;
                if let Ok(delay) = value.parse::<u32>() {
                    current.crawl_delay = Some(delay);
                }
            }
            "sitemap" => {
                if !value.is_empty() {
                    robots.sitemaps.push(value.to_string());
                }
            }
            _ => {}
        }
    }

    if !current.user_agents.is_empty() {
        robots.groups.push(current);
    }

    robots
}

/// Heuristic for servers that answer every path with an HTML page
pub fn looks_like_html(body: &str) -> bool {
    let head = body.trim_start();
    head.starts_with('<')
}

impl RobotsTxt {
    /// Group naming `agent` exactly (case-insensitive)
    pub fn group_for(&self, agent: &str) -> Option<&AgentGroup> {
        self.groups.iter().find(|group| group.names(agent))
    }

    /// Group that applies to `agent`, falling back to `*`
    pub fn effective_group(&self, agent: &str) -> Option<&AgentGroup> {
        self.group_for(agent).or_else(|| self.group_for("*"))
    }

    /// Whether the wildcard group disallows the whole site
    pub fn blocks_everyone(&self) -> bool {
        self.group_for("*").is_some_and(AgentGroup::blocks_all)
    }

    /// Known AI crawlers that have a group of their own
    pub fn addressed_ai_crawlers(&self) -> Vec<&'static str> {
        AI_CRAWLERS
            .iter()
            .copied()
            .filter(|crawler| self.group_for(crawler).is_some())
            .collect()
    }

    /// Access level for a specific crawler
    pub fn crawler_access(&self, crawler: &str) -> AccessLevel {
        if let Some(group) = self.group_for(crawler) {
            return AccessLevel::from_group(group);
        }

        match self.group_for("*") {
            Some(group) if group.blocks_all() => AccessLevel::Blocked,
            Some(group) if !group.disallow.is_empty() => AccessLevel::Partial,
            _ => AccessLevel::Default,
        }
    }

    /// Check if a specific path is allowed for a user agent.
    ///
    /// Allow rules take precedence over disallow rules with a prefix match.
    pub fn is_path_allowed(&self, path: &str, agent: &str) -> bool {
        let Some(group) = self.effective_group(agent) else {
            return true;
        };

        if group.allow.iter().any(|allow| path.starts_with(allow.as_str())) {
            return true;
        }

        !group
            .disallow
            .iter()
            .any(|disallow| path.starts_with(disallow.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_robots() {
        let content = r#"
User-agent: *
Disallow: /admin/
Disallow: /private/

Sitemap: https://example.com/sitemap.xml
"#;

        let robots = parse_robots_txt(content);
        assert_eq!(robots.sitemaps, vec!["https://example.com/sitemap.xml"]);

        let wildcard = robots.group_for("*").unwrap();
        assert_eq!(wildcard.disallow.len(), 2);
        assert!(!wildcard.blocks_all());
        assert!(!robots.blocks_everyone());
    }

    #[test]
    fn consecutive_user_agents_share_a_group() {
        let content = r#"
User-agent: GPTBot
User-agent: ClaudeBot
Disallow: /

User-agent: *
Allow: /
"#;

        let robots = parse_robots_txt(content);
        assert_eq!(robots.groups.len(), 2);
        assert_eq!(robots.crawler_access("GPTBot"), AccessLevel::Blocked);
        assert_eq!(robots.crawler_access("claudebot"), AccessLevel::Blocked);
        assert_eq!(robots.crawler_access("PerplexityBot"), AccessLevel::Default);
        assert_eq!(robots.addressed_ai_crawlers(), vec!["GPTBot", "ClaudeBot"]);
    }

    #[test]
    fn test_parse_ai_crawler_block() {
        let content = r#"
User-agent: *
Disallow:

User-agent: GPTBot
Disallow: /
"#;

        let robots = parse_robots_txt(content);
        assert_eq!(robots.crawler_access("GPTBot"), AccessLevel::Blocked);
        assert_eq!(robots.crawler_access("ClaudeBot"), AccessLevel::Default);
    }

    #[test]
    fn wildcard_full_block_applies_to_unnamed_crawlers() {
        let robots = parse_robots_txt("User-agent: *\nDisallow: /\n");
        assert!(robots.blocks_everyone());
        assert_eq!(robots.crawler_access("CCBot"), AccessLevel::Blocked);
        assert!(robots.addressed_ai_crawlers().is_empty());
    }

    #[test]
    fn test_is_path_allowed() {
        let content = r#"
User-agent: *
Disallow: /admin/
Allow: /admin/public/
"#;

        let robots = parse_robots_txt(content);

        assert!(robots.is_path_allowed("/", "*"));
        assert!(!robots.is_path_allowed("/admin/secret", "*"));
        assert!(robots.is_path_allowed("/admin/public/doc.html", "*"));
        assert!(!robots.is_path_allowed("/admin/secret", "SomeBot"));
    }

    #[test]
    fn ignores_comments_and_junk() {
        let content = "# hello\nUser-agent: * # everyone\nDisallow: /tmp # scratch\nnot a directive\n";
        let robots = parse_robots_txt(content);
        assert_eq!(robots.groups.len(), 1);
        assert_eq!(robots.groups[0].disallow, vec!["/tmp"]);
    }

    #[test]
    fn test_multiple_sitemaps() {
        let content = r#"
Sitemap: https://example.com/sitemap.xml
Sitemap: https://example.com/sitemap-images.xml
Sitemap: https://example.com/sitemap-videos.xml
"#;

        let robots = parse_robots_txt(content);
        assert_eq!(robots.sitemaps.len(), 3);
        assert!(robots.groups.is_empty());
    }

    #[test]
    fn leading_byte_order_mark_is_ignored() {
        let robots = parse_robots_txt("\u{feff}User-agent: GPTBot\nDisallow: /\n");
        assert_eq!(robots.groups.len(), 1);
        assert_eq!(robots.crawler_access("GPTBot"), AccessLevel::Blocked);
    }

    #[test]
    fn crawl_delay_is_kept_per_group() {
        let robots = parse_robots_txt("User-agent: CCBot\nCrawl-delay: 10\nDisallow: /tmp\n");
        assert_eq!(robots.group_for("CCBot").unwrap().crawl_delay, Some(10));
        assert_eq!(robots.crawler_access("CCBot"), AccessLevel::Partial);
    }

    #[test]
    fn html_fallback_pages_are_detected() {
        assert!(looks_like_html("  <!DOCTYPE html><html></html>"));
        assert!(!looks_like_html("User-agent: *\nDisallow:"));
    }
}
