//! Weighted scoring over the fixed criteria table
//!
//! The score is always computed over every criterion. Display modes only
//! filter which rows are shown, so the quick and full views of one analysis
//! report the same percentage.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashSet;

use crate::error::ScoreError;
use crate::types::{CheckKey, CheckResult, Interpretation, Mode};

/// Static description of one criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckDefinition {
    pub key: CheckKey,
    pub display_name: &'static str,
    pub weight: u32,
}

const fn def(key: CheckKey, display_name: &'static str, weight: u32) -> CheckDefinition {
    CheckDefinition {
        key,
        display_name,
        weight,
    }
}

/// The canonical criteria table. Weights sum to 100.
pub const STANDARD_DEFINITIONS: [CheckDefinition; 15] = [
    def(CheckKey::RobotsTxt, "robots.txt", 12),
    def(CheckKey::SitemapXml, "sitemap.xml", 10),
    def(CheckKey::XRobotsTag, "X-Robots-Tag header", 6),
    def(CheckKey::MetaRobots, "Meta robots", 8),
    def(CheckKey::Canonical, "Canonical tag", 6),
    def(CheckKey::Title, "Title tag", 8),
    def(CheckKey::MetaDescription, "Meta description", 8),
    def(CheckKey::OgTitle, "Open Graph title", 5),
    def(CheckKey::OgDescription, "Open Graph description", 5),
    def(CheckKey::H1, "Main heading (H1)", 7),
    def(CheckKey::StructuredData, "Structured data (JSON-LD)", 10),
    def(CheckKey::AiInstructions, "AI crawler instructions", 4),
    def(CheckKey::ImageAlt, "Image alt text", 5),
    def(CheckKey::Favicon, "Favicon", 2),
    def(CheckKey::HttpStatus, "HTTP status / redirects", 4),
];

/// Criteria shown in quick mode, in canonical order
pub const QUICK_KEYS: [CheckKey; 5] = [
    CheckKey::RobotsTxt,
    CheckKey::SitemapXml,
    CheckKey::Canonical,
    CheckKey::Title,
    CheckKey::MetaDescription,
];

static STANDARD_TABLE: Lazy<WeightTable> = Lazy::new(|| {
    WeightTable::new(STANDARD_DEFINITIONS.to_vec()).expect("invalid standard weight table")
});

/// Validated criteria table with its total weight precomputed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightTable {
    definitions: Vec<CheckDefinition>,
    total_weight: u32,
}

impl WeightTable {
    /// Build a table, rejecting duplicate keys and non-positive weights.
    pub fn new(definitions: Vec<CheckDefinition>) -> Result<Self, ScoreError> {
        let mut seen = HashSet::new();
        for definition in &definitions {
            if !seen.insert(definition.key) {
                return Err(ScoreError::InvalidWeightTable(format!(
                    "duplicate key {}",
                    definition.key
                )));
            }
            if definition.weight == 0 {
                return Err(ScoreError::InvalidWeightTable(format!(
                    "weight for {} must be positive",
                    definition.key
                )));
            }
        }

        let total_weight = definitions.iter().map(|d| d.weight).sum::<u32>();
        if total_weight == 0 {
            return Err(ScoreError::InvalidWeightTable(
                "total weight must be positive".to_string(),
            ));
        }

        Ok(Self {
            definitions,
            total_weight,
        })
    }

    /// The process-wide canonical table.
    pub fn standard() -> &'static WeightTable {
        &STANDARD_TABLE
    }

    pub fn definitions(&self) -> &[CheckDefinition] {
        &self.definitions
    }

    pub fn total_weight(&self) -> u32 {
        self.total_weight
    }

    pub fn weight(&self, key: CheckKey) -> Option<u32> {
        self.definitions
            .iter()
            .find(|definition| definition.key == key)
            .map(|definition| definition.weight)
    }

    /// Score a full result list.
    ///
    /// `score = round(100 * earned / total)`, rounded half up and computed in
    /// integer arithmetic so identical inputs always give identical output.
    pub fn score(
        &self,
        checks: &[CheckResult],
        bands: &InterpretationBands,
    ) -> Result<ScoreSummary, ScoreError> {
        if self.total_weight == 0 {
            return Err(ScoreError::InvalidWeightTable(
                "total weight must be positive".to_string(),
            ));
        }

        let mut earned_weight = 0u32;
        for check in checks {
            let weight = self.weight(check.key).ok_or_else(|| {
                ScoreError::InvalidWeightTable(format!("no definition for key {}", check.key))
            })?;
            if check.passed {
                earned_weight += weight;
            }
        }

        let earned = u64::from(earned_weight);
        let total = u64::from(self.total_weight);
        let rounded = (200 * earned + total) / (2 * total);
        let score = rounded.min(100) as u8;

        Ok(ScoreSummary {
            score,
            interpretation: bands.interpret(score),
            earned_weight,
            total_weight: self.total_weight,
        })
    }
}

/// Inclusive lower bounds for each interpretation band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InterpretationBands {
    pub excellent: u8,
    pub good: u8,
    pub moderate: u8,
}

impl Default for InterpretationBands {
    fn default() -> Self {
        Self {
            excellent: 85,
            good: 70,
            moderate: 50,
        }
    }
}

impl InterpretationBands {
    pub fn interpret(&self, score: u8) -> Interpretation {
        if score >= self.excellent {
            Interpretation::Excellent
        } else if score >= self.good {
            Interpretation::Good
        } else if score >= self.moderate {
            Interpretation::Moderate
        } else {
            Interpretation::Low
        }
    }
}

/// Numeric outcome of scoring one result list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreSummary {
    pub score: u8,
    pub interpretation: Interpretation,
    pub earned_weight: u32,
    pub total_weight: u32,
}

/// Rows visible in `mode`, preserving canonical order.
pub fn display_subset(mode: Mode, checks: &[CheckResult]) -> Vec<CheckResult> {
    match mode {
        Mode::Full => checks.to_vec(),
        Mode::Quick => checks
            .iter()
            .filter(|check| QUICK_KEYS.contains(&check.key))
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results(passing: &[CheckKey]) -> Vec<CheckResult> {
        CheckKey::ALL
            .iter()
            .map(|key| CheckResult::new(*key, passing.contains(key), "test"))
            .collect()
    }

    #[test]
    fn standard_table_is_valid_and_sums_to_100() {
        let table = WeightTable::new(STANDARD_DEFINITIONS.to_vec()).unwrap();
        assert_eq!(table.total_weight(), 100);
        assert_eq!(WeightTable::standard(), &table);
    }

    #[test]
    fn standard_table_follows_canonical_order() {
        let keys: Vec<CheckKey> = STANDARD_DEFINITIONS.iter().map(|d| d.key).collect();
        assert_eq!(keys, CheckKey::ALL.to_vec());
    }

    #[test]
    fn all_passing_scores_100() {
        let summary = WeightTable::standard()
            .score(&results(&CheckKey::ALL), &InterpretationBands::default())
            .unwrap();
        assert_eq!(summary.score, 100);
        assert_eq!(summary.interpretation, Interpretation::Excellent);
    }

    #[test]
    fn nothing_passing_scores_zero() {
        let summary = WeightTable::standard()
            .score(&results(&[]), &InterpretationBands::default())
            .unwrap();
        assert_eq!(summary.score, 0);
        assert_eq!(summary.earned_weight, 0);
        assert_eq!(summary.interpretation, Interpretation::Low);
    }

    #[test]
    fn earned_weight_sums_passed_definitions() {
        let passing = [
            CheckKey::Title,
            CheckKey::MetaDescription,
            CheckKey::Canonical,
            CheckKey::StructuredData,
        ];
        let summary = WeightTable::standard()
            .score(&results(&passing), &InterpretationBands::default())
            .unwrap();
        assert_eq!(summary.earned_weight, 8 + 8 + 6 + 10);
        assert_eq!(summary.score, 32);
    }

    #[test]
    fn rounds_half_up() {
        let table = WeightTable::new(vec![
            def(CheckKey::Title, "Title", 1),
            def(CheckKey::H1, "H1", 1),
            def(CheckKey::Favicon, "Favicon", 6),
        ])
        .unwrap();
        // 1/8 = 12.5%
        let checks = vec![
            CheckResult::pass(CheckKey::Title, ""),
            CheckResult::fail(CheckKey::H1, ""),
            CheckResult::fail(CheckKey::Favicon, ""),
        ];
        let summary = table.score(&checks, &InterpretationBands::default()).unwrap();
        assert_eq!(summary.score, 13);
    }

    #[test]
    fn unknown_key_is_a_table_error() {
        let table = WeightTable::new(vec![def(CheckKey::Title, "Title", 5)]).unwrap();
        let err = table
            .score(
                &[CheckResult::pass(CheckKey::H1, "")],
                &InterpretationBands::default(),
            )
            .unwrap_err();
        assert!(matches!(err, ScoreError::InvalidWeightTable(msg) if msg.contains("h1")));
    }

    #[test]
    fn rejects_duplicate_keys_and_zero_weights() {
        let duplicate = WeightTable::new(vec![
            def(CheckKey::Title, "Title", 5),
            def(CheckKey::Title, "Title again", 5),
        ]);
        assert!(duplicate.is_err());

        let zero = WeightTable::new(vec![def(CheckKey::Title, "Title", 0)]);
        assert!(zero.is_err());

        let empty = WeightTable::new(Vec::new());
        assert!(empty.is_err());
    }

    #[test]
    fn band_boundaries_are_inclusive() {
        let bands = InterpretationBands::default();
        assert_eq!(bands.interpret(100), Interpretation::Excellent);
        assert_eq!(bands.interpret(85), Interpretation::Excellent);
        assert_eq!(bands.interpret(84), Interpretation::Good);
        assert_eq!(bands.interpret(70), Interpretation::Good);
        assert_eq!(bands.interpret(69), Interpretation::Moderate);
        assert_eq!(bands.interpret(50), Interpretation::Moderate);
        assert_eq!(bands.interpret(49), Interpretation::Low);
        assert_eq!(bands.interpret(0), Interpretation::Low);
    }

    #[test]
    fn quick_subset_is_five_rows_in_canonical_order() {
        let all = results(&[CheckKey::Title]);
        let quick = display_subset(Mode::Quick, &all);
        let keys: Vec<CheckKey> = quick.iter().map(|c| c.key).collect();
        assert_eq!(keys, QUICK_KEYS.to_vec());

        let full = display_subset(Mode::Full, &all);
        assert_eq!(full, all);
    }

    #[test]
    fn scoring_is_deterministic() {
        let checks = results(&[CheckKey::RobotsTxt, CheckKey::Favicon, CheckKey::H1]);
        let bands = InterpretationBands::default();
        let first = WeightTable::standard().score(&checks, &bands).unwrap();
        for _ in 0..10 {
            assert_eq!(WeightTable::standard().score(&checks, &bands).unwrap(), first);
        }
    }
}
