//! Environment-driven configuration.
//!
//! Values come from the process environment, with a `.env` file in the
//! working directory loaded first when present.

use std::fmt;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_API_VERSION: &str = "2023-04-01";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Connection settings for the Azure AI Language resource.
#[derive(Clone)]
pub struct LanguageConfig {
    pub endpoint: String,
    pub key: String,
    pub api_version: String,
    pub timeout: Duration,
}

impl fmt::Debug for LanguageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LanguageConfig")
            .field("endpoint", &self.endpoint)
            .field("key", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl LanguageConfig {
    pub fn new(endpoint: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            key: key.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Load from `AZURE_LANGUAGE_*` variables (and `.env`).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let (Some(endpoint), Some(key)) = (
            non_empty("AZURE_LANGUAGE_ENDPOINT"),
            non_empty("AZURE_LANGUAGE_KEY"),
        ) else {
            return Err(ConfigError::MissingCredentials);
        };

        let mut config = Self::new(endpoint.trim(), key.trim());

        if let Some(version) = non_empty("AZURE_LANGUAGE_API_VERSION") {
            config.api_version = version.trim().to_string();
        }

        if let Some(raw) = non_empty("AZURE_LANGUAGE_TIMEOUT_SECS") {
            let secs: u64 = raw
                .trim()
                .parse()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidValue {
                    name: "AZURE_LANGUAGE_TIMEOUT_SECS",
                    value: raw.clone(),
                })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self {
            bind_addr: std::env::var("MOODIFY_BIND_ADDR")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
        }
    }
}
