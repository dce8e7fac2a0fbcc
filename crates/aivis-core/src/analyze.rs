//! The analysis pipeline: validate, fetch, evaluate, score.

use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::checks::{self, PageArtifacts};
use crate::error::{AnalysisError, FetchError};
use crate::fetch::{DEFAULT_TIMEOUT, FetchedResource, PageFetcher};
use crate::scoring::{InterpretationBands, WeightTable};
use crate::types::AnalysisReport;
use crate::url_utils;

/// Scoring configuration and fetch budget for analyses
#[derive(Debug, Clone)]
pub struct Analyzer<'a> {
    table: &'a WeightTable,
    bands: InterpretationBands,
    timeout: Duration,
}

impl Default for Analyzer<'static> {
    fn default() -> Self {
        Self {
            table: WeightTable::standard(),
            bands: InterpretationBands::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl<'a> Analyzer<'a> {
    pub fn new(table: &'a WeightTable, bands: InterpretationBands, timeout: Duration) -> Self {
        Self {
            table,
            bands,
            timeout,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Analyze the URL given by the caller.
    ///
    /// Fails only on unusable input or a scoring configuration defect; fetch
    /// problems are reflected in the individual check results.
    pub async fn analyze<F>(&self, fetcher: &F, input: &str) -> Result<AnalysisReport, AnalysisError>
    where
        F: PageFetcher + ?Sized,
    {
        let url = url_utils::normalize_target_url(input)?;
        let robots_url = url_utils::companion_url(&url, "/robots.txt")?;
        let sitemap_url = url_utils::companion_url(&url, "/sitemap.xml")?;

        info!(url = %url, "analyzing");

        let (page, robots_txt, sitemap_xml) = tokio::join!(
            self.fetch_bounded(fetcher, &url),
            self.fetch_bounded(fetcher, &robots_url),
            self.fetch_bounded(fetcher, &sitemap_url),
        );

        let artifacts = PageArtifacts {
            url,
            page,
            robots_txt,
            sitemap_xml,
        };
        self.score_artifacts(&artifacts)
    }

    /// Evaluate and score already-fetched artifacts.
    pub fn score_artifacts(
        &self,
        artifacts: &PageArtifacts,
    ) -> Result<AnalysisReport, AnalysisError> {
        let checks = checks::evaluate(artifacts);
        let summary = self.table.score(&checks, &self.bands)?;

        info!(
            url = %artifacts.url,
            score = summary.score,
            interpretation = %summary.interpretation,
            passed = checks.iter().filter(|check| check.passed).count(),
            "analysis complete"
        );

        Ok(AnalysisReport {
            url: artifacts.url.to_string(),
            score: summary.score,
            interpretation: summary.interpretation,
            checks,
        })
    }

    async fn fetch_bounded<F>(&self, fetcher: &F, url: &Url) -> Result<FetchedResource, FetchError>
    where
        F: PageFetcher + ?Sized,
    {
        let outcome = match tokio::time::timeout(self.timeout, fetcher.fetch(url)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(FetchError::Timeout(self.timeout)),
        };

        match &outcome {
            Ok(resource) => debug!(url = %url, status = resource.status, "fetch finished"),
            Err(error) => warn!(url = %url, error = %error, "fetch degraded"),
        }
        outcome
    }
}
