use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Result, StoryError};

pub const DEFAULT_BASE_URL: &str = "https://hack-or-snooze-v3.herokuapp.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_NAMESPACE: &str = "default";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Client settings read from `config.toml`.
///
/// Every field is optional in the file; missing fields take their defaults.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
    /// Storage scope for the credential record; one file per namespace
    pub storage_namespace: String,
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            storage_namespace: DEFAULT_NAMESPACE.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Values layered over a loaded [`ClientConfig`] (environment, then CLI flags).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub storage_namespace: Option<String>,
    pub log_level: Option<String>,
}

impl ClientConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Applies every `Some` field of `overrides`.
    pub fn apply(&mut self, overrides: ConfigOverrides) {
        if let Some(base_url) = overrides.base_url {
            self.base_url = base_url;
        }
        if let Some(namespace) = overrides.storage_namespace {
            self.storage_namespace = namespace;
        }
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }
    }

    /// Rejects settings the client cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(StoryError::config(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(StoryError::config("request_timeout_secs must be positive"));
        }
        let namespace_ok = !self.storage_namespace.is_empty()
            && self
                .storage_namespace
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !namespace_ok {
            return Err(StoryError::config(format!(
                "storage_namespace may only contain letters, digits, '-' and '_', got '{}'",
                self.storage_namespace
            )));
        }
        Ok(())
    }
}
