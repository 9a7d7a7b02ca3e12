//! File-backed [`KeyValueStore`]: one TOML table of strings per namespace.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::atomic_toml::AtomicTomlFile;
use crate::paths::SnoozePaths;
use snooze_core::error::{Result, StoryError};
use snooze_core::storage::KeyValueStore;

type Table = BTreeMap<String, String>;

/// Persists a key/value namespace to `<storage dir>/<namespace>.toml`.
///
/// Every mutation is a locked read-modify-write followed by an atomic
/// rename, so other processes sharing the namespace never read a torn file
/// and keys they own are preserved.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    file: AtomicTomlFile<Table>,
}

impl FileKeyValueStore {
    pub fn new(paths: &SnoozePaths, namespace: &str) -> Self {
        Self::with_path(paths.storage_file(namespace))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: AtomicTomlFile::new(path),
        }
    }

    async fn blocking<R, F>(&self, f: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce(AtomicTomlFile<Table>) -> Result<R> + Send + 'static,
    {
        let file = self.file.clone();
        tokio::task::spawn_blocking(move || f(file))
            .await
            .map_err(|e| StoryError::internal(format!("Storage task failed: {}", e)))?
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        self.blocking(move |file| Ok(file.load()?.and_then(|mut table| table.remove(&key))))
            .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let (key, value) = (key.to_string(), value.to_string());
        self.blocking(move |file| {
            file.update(Table::new(), |table| {
                table.insert(key, value);
                Ok(())
            })
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let key = key.to_string();
        self.blocking(move |file| {
            if !file.path().exists() {
                return Ok(());
            }
            file.update(Table::new(), |table| {
                table.remove(&key);
                Ok(())
            })
        })
        .await
    }

    async fn keys(&self) -> Result<Vec<String>> {
        self.blocking(|file| {
            Ok(file
                .load()?
                .map(|table| table.into_keys().collect())
                .unwrap_or_default())
        })
        .await
    }
}
