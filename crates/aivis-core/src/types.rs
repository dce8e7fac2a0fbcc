//! Common types used across aivis

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::InputError;

/// Identifier of one visibility criterion.
///
/// Variant order is the canonical report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKey {
    RobotsTxt,
    SitemapXml,
    XRobotsTag,
    MetaRobots,
    Canonical,
    Title,
    MetaDescription,
    OgTitle,
    OgDescription,
    H1,
    StructuredData,
    AiInstructions,
    ImageAlt,
    Favicon,
    HttpStatus,
}

impl CheckKey {
    /// Every criterion, in canonical order.
    pub const ALL: [CheckKey; 15] = [
        CheckKey::RobotsTxt,
        CheckKey::SitemapXml,
        CheckKey::XRobotsTag,
        CheckKey::MetaRobots,
        CheckKey::Canonical,
        CheckKey::Title,
        CheckKey::MetaDescription,
        CheckKey::OgTitle,
        CheckKey::OgDescription,
        CheckKey::H1,
        CheckKey::StructuredData,
        CheckKey::AiInstructions,
        CheckKey::ImageAlt,
        CheckKey::Favicon,
        CheckKey::HttpStatus,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CheckKey::RobotsTxt => "robots_txt",
            CheckKey::SitemapXml => "sitemap_xml",
            CheckKey::XRobotsTag => "x_robots_tag",
            CheckKey::MetaRobots => "meta_robots",
            CheckKey::Canonical => "canonical",
            CheckKey::Title => "title",
            CheckKey::MetaDescription => "meta_description",
            CheckKey::OgTitle => "og_title",
            CheckKey::OgDescription => "og_description",
            CheckKey::H1 => "h1",
            CheckKey::StructuredData => "structured_data",
            CheckKey::AiInstructions => "ai_instructions",
            CheckKey::ImageAlt => "image_alt",
            CheckKey::Favicon => "favicon",
            CheckKey::HttpStatus => "http_status",
        }
    }

    /// Human-readable name from the standard definition table.
    pub fn display_name(self) -> &'static str {
        crate::scoring::STANDARD_DEFINITIONS
            .iter()
            .find(|definition| definition.key == self)
            .map(|definition| definition.display_name)
            .unwrap_or_else(|| self.as_str())
    }
}

impl fmt::Display for CheckKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one criterion for one analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub key: CheckKey,
    pub name: String,
    pub passed: bool,
    /// Evidence when passed, reason when failed
    pub description: String,
}

impl CheckResult {
    pub fn new(key: CheckKey, passed: bool, description: impl Into<String>) -> Self {
        Self {
            key,
            name: key.display_name().to_string(),
            passed,
            description: description.into(),
        }
    }

    pub fn pass(key: CheckKey, description: impl Into<String>) -> Self {
        Self::new(key, true, description)
    }

    pub fn fail(key: CheckKey, description: impl Into<String>) -> Self {
        Self::new(key, false, description)
    }
}

/// Coarse label derived from the numeric score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interpretation {
    Low,
    Moderate,
    Good,
    Excellent,
}

impl Interpretation {
    pub fn as_str(self) -> &'static str {
        match self {
            Interpretation::Low => "Low",
            Interpretation::Moderate => "Moderate",
            Interpretation::Good => "Good",
            Interpretation::Excellent => "Excellent",
        }
    }
}

impl fmt::Display for Interpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which rows of the checklist a caller gets to see.
///
/// The mode never changes the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Quick,
    Full,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Quick => "quick",
            Mode::Full => "full",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quick" => Ok(Mode::Quick),
            // "pro" is the paid tier name used by the checkout pages
            "full" | "pro" => Ok(Mode::Full),
            other => Err(InputError::UnknownMode(other.to_string())),
        }
    }
}

/// Result of one analysis over all criteria
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Normalized URL that was analyzed
    pub url: String,

    /// Weighted score (0-100)
    pub score: u8,

    pub interpretation: Interpretation,

    /// All results, in canonical order
    pub checks: Vec<CheckResult>,
}

impl AnalysisReport {
    /// Project the report onto the rows visible in `mode`.
    pub fn view(&self, mode: Mode) -> ReportView {
        ReportView {
            url: self.url.clone(),
            mode,
            score: self.score,
            interpretation: self.interpretation,
            checks: crate::scoring::display_subset(mode, &self.checks),
            total_checks: self.checks.len(),
        }
    }
}

/// What a caller receives for a given display mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportView {
    pub url: String,
    pub mode: Mode,
    pub score: u8,
    pub interpretation: Interpretation,
    pub checks: Vec<CheckResult>,
    pub total_checks: usize,
}
