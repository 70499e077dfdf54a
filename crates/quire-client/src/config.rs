use std::env;
use std::time::Duration;

use anyhow::{bail, Context};
use url::Url;

/// Client configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL
    pub api_url: Url,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Inactivity window for collaborator search
    pub search_debounce: Duration,
}

const DEFAULT_API_URL: &str = "http://localhost:5000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

impl Config {
    /// Configuration for a backend at `api_url` with default timings
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            search_debounce: quire_core::state::SEARCH_DEBOUNCE,
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let api_url = parse_api_url(
            &env::var("QUIRE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
        )?;
        let mut config = Self::new(api_url);

        if let Ok(raw) = env::var("QUIRE_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = raw
                .parse()
                .with_context(|| format!("QUIRE_REQUEST_TIMEOUT_SECS={raw}"))?;
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Ok(raw) = env::var("QUIRE_SEARCH_DEBOUNCE_MS") {
            let millis: u64 = raw
                .parse()
                .with_context(|| format!("QUIRE_SEARCH_DEBOUNCE_MS={raw}"))?;
            config.search_debounce = Duration::from_millis(millis);
        }

        Ok(config)
    }
}

/// Parse and validate the backend base URL
pub fn parse_api_url(raw: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("invalid API URL {raw:?}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("API URL must be http or https, got {}", url.scheme());
    }
    if url.cannot_be_a_base() {
        bail!("API URL {raw:?} cannot be used as a base");
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_config_defaults() {
        let config = Config::new(parse_api_url(DEFAULT_API_URL).unwrap());
        assert_eq!(config.api_url.as_str(), "http://localhost:5000/");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.search_debounce, Duration::from_millis(400));
    }

    #[test]
    fn test_parse_api_url() {
        assert!(parse_api_url("https://docs.example.com/api").is_ok());
        assert!(parse_api_url("ftp://docs.example.com").is_err());
        assert!(parse_api_url("not a url").is_err());
    }
}
