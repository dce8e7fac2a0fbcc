use std::net::SocketAddr;
use std::time::Duration;

use aivis_core::FetchConfig;
use thiserror::Error;
use url::Url;

const DEFAULT_BIND: &str = "127.0.0.1:3000";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 12;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("AIVIS_BIND must be a socket address, got '{0}'")]
    InvalidBind(String),

    #[error("AIVIS_FETCH_TIMEOUT_SECS must be a positive integer, got '{0}'")]
    InvalidTimeout(String),

    #[error("AIVIS_PAYMENT_LINK must be an absolute http(s) URL, got '{0}'")]
    InvalidPaymentLink(String),
}

/// Server configuration loaded explicitly from environment variables.
///
/// Optional:
/// - `AIVIS_BIND`: listen address (default `127.0.0.1:3000`)
/// - `AIVIS_FETCH_TIMEOUT_SECS`: per-request fetch budget (default 12)
/// - `AIVIS_USER_AGENT`: overrides the outbound User-Agent
/// - `AIVIS_PAYMENT_LINK`: hosted payment link; omit to run the sandbox checkout
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub fetch_timeout: Duration,
    pub user_agent: Option<String>,
    pub payment_link: Option<Url>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let bind_raw = var("AIVIS_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidBind(bind_raw.clone()))?;

        let fetch_timeout = match var("AIVIS_FETCH_TIMEOUT_SECS") {
            None => Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|&secs| secs > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::InvalidTimeout(raw))?,
        };

        let payment_link = match var("AIVIS_PAYMENT_LINK") {
            None => None,
            Some(raw) => {
                let link = Url::parse(&raw)
                    .ok()
                    .filter(|link| matches!(link.scheme(), "http" | "https"))
                    .ok_or(ConfigError::InvalidPaymentLink(raw))?;
                Some(link)
            }
        };

        Ok(Self {
            bind,
            fetch_timeout,
            user_agent: var("AIVIS_USER_AGENT"),
            payment_link,
        })
    }

    pub fn fetch_config(&self) -> FetchConfig {
        let mut config = FetchConfig {
            timeout: self.fetch_timeout,
            ..FetchConfig::default()
        };
        if let Some(user_agent) = &self.user_agent {
            config.user_agent = user_agent.clone();
        }
        config
    }
}
