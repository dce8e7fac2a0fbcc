//! Retrieval of the page and its companion resources
//!
//! Analysis only depends on the [`PageFetcher`] trait. The reqwest-backed
//! [`HttpFetcher`] is the production implementation; tests and embedders can
//! supply their own.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

use crate::error::FetchError;

/// Default budget for every outbound request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(12);

/// Largest body kept per resource; anything beyond is dropped
pub const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

/// A fetched resource: status, headers and body text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedResource {
    /// URL after following redirects
    pub final_url: String,

    pub status: u16,

    /// Header names are lowercased; repeated headers are joined with ", "
    pub headers: HashMap<String, String>,

    pub body: String,
}

impl FetchedResource {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Whether the final URL differs from the one requested.
    pub fn was_redirected(&self, requested: &Url) -> bool {
        self.final_url != requested.as_str()
    }
}

/// Fetch collaborator used by the analysis pipeline
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedResource, FetchError>;
}

/// Timeout and identity used for outbound requests
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub user_agent: String,
    pub max_body_bytes: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!(
                "Mozilla/5.0 (compatible; aivis/{}; +https://github.com/pondevelopment/aivis)",
                env!("CARGO_PKG_VERSION")
            ),
            max_body_bytes: MAX_BODY_BYTES,
        }
    }
}

/// reqwest-backed fetcher; one shared client per instance
#[cfg(feature = "http-fetcher")]
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
    max_body_bytes: usize,
}

#[cfg(feature = "http-fetcher")]
impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> anyhow::Result<Self> {
        use anyhow::Context;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self {
            client,
            timeout: config.timeout,
            max_body_bytes: config.max_body_bytes,
        })
    }

    fn classify(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Request(error.to_string())
        }
    }

    /// Read the body chunk by chunk, stopping at `max_body_bytes`.
    async fn read_text_limited(
        &self,
        mut response: reqwest::Response,
        url: &Url,
    ) -> Result<String, FetchError> {
        let mut out: Vec<u8> = Vec::new();

        while let Some(chunk) = response.chunk().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(self.timeout)
            } else {
                FetchError::Body(e.to_string())
            }
        })? {
            if append_limited(&mut out, &chunk, self.max_body_bytes) {
                tracing::debug!(url = %url, limit = self.max_body_bytes, "response body truncated");
                break;
            }
        }

        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

#[cfg(feature = "http-fetcher")]
#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedResource, FetchError> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();

        let mut headers: HashMap<String, String> = HashMap::new();
        for (name, value) in response.headers() {
            let Ok(value) = value.to_str() else {
                continue;
            };
            headers
                .entry(name.as_str().to_ascii_lowercase())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }

        let body = self.read_text_limited(response, url).await?;

        tracing::debug!(url = %url, status, bytes = body.len(), "fetched resource");

        Ok(FetchedResource {
            final_url,
            status,
            headers,
            body,
        })
    }
}

/// Append `chunk` to `out` without growing past `limit`.
///
/// Returns `true` once the limit was hit and the chunk was cut.
#[cfg_attr(not(feature = "http-fetcher"), allow(dead_code))]
fn append_limited(out: &mut Vec<u8>, chunk: &[u8], limit: usize) -> bool {
    if out.len() + chunk.len() > limit {
        let remaining = limit.saturating_sub(out.len());
        out.extend_from_slice(&chunk[..remaining]);
        return true;
    }
    out.extend_from_slice(chunk);
    false
}
