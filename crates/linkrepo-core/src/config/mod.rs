//! Client configuration for reaching the Link Repo API.
//!
//! Values come from the environment (`LINKREPO_API_URL`,
//! `LINKREPO_HTTP_TIMEOUT_SECS`) or from a JSON document.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::{is_http_url, normalize_text_option};

const ENV_API_URL: &str = "LINKREPO_API_URL";
const ENV_HTTP_TIMEOUT_SECS: &str = "LINKREPO_HTTP_TIMEOUT_SECS";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Base URL of the API, without a trailing slash
    pub api_base_url: String,
    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            api_base_url: normalize_base_url(api_base_url.into())?,
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        })
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        parse_config(|key| env::var(key).ok())
    }

    /// Parse and validate a JSON configuration document.
    pub fn from_json(payload: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(payload)
            .map_err(|error| Error::Config(format!("invalid client config JSON: {error}")))?;
        config.validated()
    }

    #[must_use]
    pub const fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validated(self) -> Result<Self> {
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be positive".to_string()));
        }
        Ok(Self {
            api_base_url: normalize_base_url(self.api_base_url)?,
            timeout_secs: self.timeout_secs,
        })
    }
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

fn parse_config(lookup: impl Fn(&str) -> Option<String>) -> Result<ClientConfig> {
    let api_base_url = normalize_text_option(lookup(ENV_API_URL))
        .ok_or_else(|| Error::Config(format!("{ENV_API_URL} is not set")))?;

    let timeout_secs = match normalize_text_option(lookup(ENV_HTTP_TIMEOUT_SECS)) {
        Some(raw) => raw.parse::<u64>().map_err(|_| {
            Error::Config(format!(
                "{ENV_HTTP_TIMEOUT_SECS} must be a whole number of seconds, got '{raw}'"
            ))
        })?,
        None => DEFAULT_HTTP_TIMEOUT_SECS,
    };

    ClientConfig {
        api_base_url,
        timeout_secs,
    }
    .validated()
}

fn normalize_base_url(raw: String) -> Result<String> {
    let url = normalize_text_option(Some(raw))
        .ok_or_else(|| Error::Config("API base URL must not be empty".to_string()))?;
    if is_http_url(&url) {
        Ok(url.trim_end_matches('/').to_string())
    } else {
        Err(Error::Config(
            "API base URL must include http:// or https://".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn parse_config_requires_api_url() {
        let error = parse_config(lookup(&[])).unwrap_err();
        assert!(error.to_string().contains(ENV_API_URL));
    }

    #[test]
    fn parse_config_trims_trailing_slash_and_defaults_timeout() {
        let config = parse_config(lookup(&[(ENV_API_URL, " https://links.example.com/ ")])).unwrap();
        assert_eq!(config.api_base_url, "https://links.example.com");
        assert_eq!(config.timeout(), Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS));
    }

    #[test]
    fn parse_config_reads_timeout() {
        let config = parse_config(lookup(&[
            (ENV_API_URL, "http://localhost:5000"),
            (ENV_HTTP_TIMEOUT_SECS, "3"),
        ]))
        .unwrap();
        assert_eq!(config.timeout_secs, 3);

        let error = parse_config(lookup(&[
            (ENV_API_URL, "http://localhost:5000"),
            (ENV_HTTP_TIMEOUT_SECS, "soon"),
        ]))
        .unwrap_err();
        assert!(error.to_string().contains("whole number"));
    }

    #[test]
    fn base_url_requires_http_scheme() {
        assert!(ClientConfig::new("links.example.com").is_err());
        assert!(ClientConfig::new("   ").is_err());
    }

    #[test]
    fn from_json_rejects_unknown_fields() {
        let error = ClientConfig::from_json(
            r#"{"api_base_url": "https://links.example.com", "retries": 3}"#,
        )
        .unwrap_err();
        assert!(error.to_string().contains("unknown field"));
    }

    #[test]
    fn from_json_rejects_zero_timeout() {
        let error = ClientConfig::from_json(
            r#"{"api_base_url": "https://links.example.com", "timeout_secs": 0}"#,
        )
        .unwrap_err();
        assert!(error.to_string().contains("timeout_secs"));
    }
}
