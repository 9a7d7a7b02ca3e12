//! Persistent credential store.
//!
//! Mirrors a [`Session`] into a [`KeyValueStore`] namespace using one key per
//! field. The storage has no multi-key transaction, so `token` is always
//! written last and removed first: a reader that observes a token also
//! observes the other three fields.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::model::{PersistedRecord, Session};
use crate::error::Result;
use crate::storage::KeyValueStore;

pub const TOKEN_KEY: &str = "token";
pub const USERNAME_KEY: &str = "username";
pub const NAME_KEY: &str = "name";
pub const CREATION_DATE_KEY: &str = "creationDate";

/// Every key owned by the credential store, in removal order.
pub const OWNED_KEYS: [&str; 4] = [TOKEN_KEY, USERNAME_KEY, NAME_KEY, CREATION_DATE_KEY];

/// Result of reading the persisted record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredCredentials {
    /// No token present: the canonical logged-out signal.
    Absent,
    /// Token present but another field missing or unparsable.
    Corrupt,
    Present(PersistedRecord),
}

impl StoredCredentials {
    pub fn into_record(self) -> Option<PersistedRecord> {
        match self {
            Self::Present(record) => Some(record),
            Self::Absent | Self::Corrupt => None,
        }
    }
}

/// Credential mirror over a shared key/value namespace.
///
/// Only [`SessionManager`](super::SessionManager) writes through this type.
#[derive(Clone)]
pub struct PersistentCredentialStore {
    kv: Arc<dyn KeyValueStore>,
}

impl PersistentCredentialStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Persists every session field, `token` last.
    ///
    /// Any previous token is removed before the other fields are replaced, so
    /// an overwrite is never read as a mix of two sessions.
    pub async fn write(&self, session: &Session) -> Result<()> {
        self.kv.remove(TOKEN_KEY).await?;
        self.kv.set(USERNAME_KEY, &session.username).await?;
        self.kv.set(NAME_KEY, &session.display_name).await?;
        self.kv
            .set(CREATION_DATE_KEY, &session.created_at.to_rfc3339())
            .await?;
        self.kv.set(TOKEN_KEY, &session.token).await?;
        Ok(())
    }

    /// Returns the persisted record, or `None` when absent or corrupt.
    pub async fn read(&self) -> Result<Option<PersistedRecord>> {
        Ok(self.inspect().await?.into_record())
    }

    /// Reads the record and distinguishes a missing token from a corrupt record.
    pub async fn inspect(&self) -> Result<StoredCredentials> {
        let Some(token) = self.kv.get(TOKEN_KEY).await? else {
            return Ok(StoredCredentials::Absent);
        };

        let username = self.kv.get(USERNAME_KEY).await?;
        let display_name = self.kv.get(NAME_KEY).await?;
        let created_at = self
            .kv
            .get(CREATION_DATE_KEY)
            .await?
            .and_then(|raw| parse_timestamp(&raw));

        match (username, display_name, created_at) {
            (Some(username), Some(display_name), Some(created_at)) => {
                Ok(StoredCredentials::Present(PersistedRecord {
                    token,
                    username,
                    display_name,
                    created_at,
                }))
            }
            _ => Ok(StoredCredentials::Corrupt),
        }
    }

    /// Removes exactly the keys this store owns.
    pub async fn clear(&self) -> Result<()> {
        for key in OWNED_KEYS {
            self.kv.remove(key).await?;
        }
        Ok(())
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}
