//! Console configuration.
//!
//! Values are resolved once at start-up: command-line flags and `VOXDESK_*`
//! environment variables win over `config.json`, which wins over defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Resolved console configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Base URL of the platform API.
    pub api_url: String,
    /// Bearer token attached to every request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Publishable key of the payment provider (used by the billing step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stripe_publishable_key: Option<String>,
    /// Page opened in the browser to add a payment method.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_url: Option<String>,
    /// Blanket timeout for every outbound request.
    pub timeout_secs: u64,
    /// Rows fetched per call-log page.
    pub call_log_page_size: usize,
    /// Credit balance below which onboarding requires a payment method.
    pub minimum_balance: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            api_token: None,
            stripe_publishable_key: None,
            billing_url: None,
            timeout_secs: 30,
            call_log_page_size: 20,
            minimum_balance: 5.0,
        }
    }
}

/// Values supplied on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub api_token: Option<String>,
    pub stripe_publishable_key: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load config from a JSON file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(path = %path.display(), api_url = %config.api_url, "Loaded config file");
        Ok(config)
    }

    /// Write config as pretty JSON, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Read {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply command-line / environment overrides and validate the result.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        if let Some(url) = overrides.api_url {
            self.api_url = url;
        }
        if let Some(token) = overrides.api_token {
            self.api_token = Some(token);
        }
        if let Some(key) = overrides.stripe_publishable_key {
            self.stripe_publishable_key = Some(key);
        }
        if let Some(timeout) = overrides.timeout_secs {
            self.timeout_secs = timeout;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "api_url must start with http:// or https://, got '{}'",
                self.api_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be positive".to_string()));
        }
        if self.call_log_page_size == 0 {
            return Err(ConfigError::Invalid(
                "call_log_page_size must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = Config::load_from(&tmp.path().join("nope.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.call_log_page_size, 20);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, r#"{ "api_url": "https://api.example.com", "timeout_secs": 10 }"#)
            .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api_url, "https://api.example.com");
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.call_log_page_size, 20);
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_save_and_reload() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("config.json");
        let config = Config {
            api_token: Some("tok".to_string()),
            ..Default::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_overrides_win() {
        let config = Config::default()
            .with_overrides(ConfigOverrides {
                api_url: Some("https://prod.example.com".to_string()),
                api_token: Some("secret".to_string()),
                timeout_secs: Some(5),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(config.api_url, "https://prod.example.com");
        assert_eq!(config.api_token.as_deref(), Some("secret"));
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_rejects_bad_url() {
        let err = Config::default()
            .with_overrides(ConfigOverrides {
                api_url: Some("ftp://nope".to_string()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
