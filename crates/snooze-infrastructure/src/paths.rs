//! Path management for snooze configuration, storage and logs.

use std::path::{Path, PathBuf};

use snooze_core::error::{Result, StoryError};

const APP_DIR: &str = "snooze";

/// Resolves every on-disk location the client uses.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/snooze/            # Config directory
/// ├── config.toml              # ClientConfig
/// ├── storage/                 # One key/value file per namespace
/// │   └── default.toml
/// └── logs/                    # Application logs
///     └── snooze.log.YYYY-MM-DD
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnoozePaths {
    root: PathBuf,
}

impl SnoozePaths {
    /// Uses the platform config directory (`~/.config/snooze` on Linux).
    pub fn from_platform() -> Result<Self> {
        let base = dirs::config_dir()
            .ok_or_else(|| StoryError::config("Cannot find the user config directory"))?;
        Ok(Self {
            root: base.join(APP_DIR),
        })
    }

    /// Roots every path under `root` instead of the platform directory.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn config_dir(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    pub fn storage_dir(&self) -> PathBuf {
        self.root.join("storage")
    }

    /// The key/value file backing `namespace`.
    pub fn storage_file(&self, namespace: &str) -> PathBuf {
        self.storage_dir().join(format!("{}.toml", namespace))
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }
}
