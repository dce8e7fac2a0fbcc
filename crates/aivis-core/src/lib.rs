//! # aivis-core
//!
//! Core library for scoring how visible a web page is to AI crawlers and
//! assistants.
//!
//! This library provides:
//! - A fixed battery of 15 checks over a page, its robots.txt and sitemap.xml
//! - A weighted scorer producing a 0-100 score and an interpretation band
//! - Quick/full display views that always share one score
//!
//! ## Features
//!
//! - `default`: includes `http-fetcher`
//! - `http-fetcher`: reqwest-backed [`HttpFetcher`]
//!
//! ## Example
//!
//! ```no_run
//! use aivis_core::{Analyzer, FetchConfig, HttpFetcher, Mode};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let fetcher = HttpFetcher::new(&FetchConfig::default())?;
//! let report = Analyzer::default().analyze(&fetcher, "example.com").await?;
//! let quick = report.view(Mode::Quick);
//! println!("{}% ({})", quick.score, quick.interpretation);
//! # Ok(())
//! # }
//! ```

pub mod analyze;
pub mod checks;
pub mod error;
pub mod fetch;
pub mod parser;
pub mod robots_txt;
pub mod scoring;
pub mod sitemap;
pub mod types;
pub mod url_utils;

// Re-export commonly used types
pub use analyze::Analyzer;
pub use checks::PageArtifacts;
pub use error::{AnalysisError, FetchError, InputError, ScoreError};
pub use fetch::{FetchConfig, FetchedResource, PageFetcher};
pub use scoring::{
    CheckDefinition, InterpretationBands, QUICK_KEYS, STANDARD_DEFINITIONS, ScoreSummary,
    WeightTable,
};
pub use types::{AnalysisReport, CheckKey, CheckResult, Interpretation, Mode, ReportView};

#[cfg(feature = "http-fetcher")]
pub use fetch::HttpFetcher;
