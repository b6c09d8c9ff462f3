//! API endpoint and credential settings

use std::fmt;
use std::path::Path;
use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;

use crate::error::ConfigError;

/// Settings as read from a TOML file, environment or command line.
/// Any field may be missing until [`Settings::into_config`] validates them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Ticket API URL, e.g. `https://helpdesk.example.com/api/tickets`
    pub endpoint: Option<String>,

    /// Credential sent verbatim after `Authorization: Basic`
    pub api_key: Option<String>,

    /// Request timeout in seconds; 0 or absent means none
    pub timeout_secs: Option<u64>,
}

impl Settings {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Fill fields missing here from `fallback`
    #[must_use]
    pub fn or(self, fallback: Self) -> Self {
        Self {
            endpoint: self.endpoint.or(fallback.endpoint),
            api_key: self.api_key.or(fallback.api_key),
            timeout_secs: self.timeout_secs.or(fallback.timeout_secs),
        }
    }

    pub fn into_config(self) -> Result<Config, ConfigError> {
        let endpoint = self
            .endpoint
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .ok_or(ConfigError::Missing("endpoint"))?;
        let api_key = self
            .api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::Missing("api_key"))?;

        let url = Url::parse(&endpoint).map_err(|e| ConfigError::InvalidEndpoint {
            url: endpoint.clone(),
            details: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEndpoint {
                url: endpoint,
                details: format!("unsupported scheme {}", url.scheme()),
            });
        }

        Ok(Config {
            endpoint: url,
            api_key,
            timeout: self
                .timeout_secs
                .filter(|&secs| secs > 0)
                .map(Duration::from_secs),
        })
    }
}

/// Validated configuration for [`crate::HttpSubmitter`]
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub endpoint: Url,
    pub api_key: String,
    pub timeout: Option<Duration>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}
