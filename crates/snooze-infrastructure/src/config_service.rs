//! Configuration service.
//!
//! Loads [`ClientConfig`] from `<config dir>/config.toml` and layers the
//! `SNOOZE_*` environment variables on top.

use snooze_core::config::{ClientConfig, ConfigOverrides};
use snooze_core::error::Result;

use crate::paths::SnoozePaths;
use crate::storage::AtomicTomlFile;

pub const BASE_URL_ENV: &str = "SNOOZE_BASE_URL";
pub const NAMESPACE_ENV: &str = "SNOOZE_NAMESPACE";

#[derive(Debug, Clone)]
pub struct ConfigService {
    file: AtomicTomlFile<ClientConfig>,
}

impl ConfigService {
    pub fn new(paths: &SnoozePaths) -> Self {
        Self {
            file: AtomicTomlFile::new(paths.config_file()),
        }
    }

    /// Loads the file (defaults when missing) with process environment overrides.
    pub fn load(&self) -> Result<ClientConfig> {
        self.load_with_env(|name| std::env::var(name).ok())
    }

    /// Same as [`Self::load`] with an explicit environment lookup.
    pub fn load_with_env<F>(&self, lookup: F) -> Result<ClientConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match self.file.load()? {
            Some(config) => config,
            None => {
                tracing::debug!(
                    "[ConfigService] No config at {}, using defaults",
                    self.file.path().display()
                );
                ClientConfig::default()
            }
        };

        config.apply(ConfigOverrides {
            base_url: lookup(BASE_URL_ENV).filter(|v| !v.is_empty()),
            storage_namespace: lookup(NAMESPACE_ENV).filter(|v| !v.is_empty()),
            log_level: None,
        });
        Ok(config)
    }

    /// Writes `config` to the config file.
    pub fn save(&self, config: &ClientConfig) -> Result<()> {
        self.file.save(config)
    }
}
