//! Session domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authenticated identity held for the current process.
///
/// At most one `Session` is live at a time and it is owned by
/// [`SessionManager`](super::SessionManager). Other components only ever see
/// clones handed out by [`SessionManager::current`](super::SessionManager::current).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Login token issued by the remote service
    pub token: String,
    pub username: String,
    /// Human readable name chosen at signup
    pub display_name: String,
    /// Account creation timestamp reported by the remote service
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Account creation date as shown on the profile panel (`YYYY-MM-DD`).
    pub fn created_on(&self) -> String {
        self.created_at.format("%Y-%m-%d").to_string()
    }
}

/// Identity payload returned by the remote authentication endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub token: String,
    pub username: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for Session {
    fn from(account: Account) -> Self {
        Self {
            token: account.token,
            username: account.username,
            display_name: account.display_name,
            created_at: account.created_at,
        }
    }
}

/// Durable mirror of a [`Session`], one storage key per field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedRecord {
    pub token: String,
    pub username: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Session> for PersistedRecord {
    fn from(session: &Session) -> Self {
        Self {
            token: session.token.clone(),
            username: session.username.clone(),
            display_name: session.display_name.clone(),
            created_at: session.created_at,
        }
    }
}

impl From<PersistedRecord> for Session {
    fn from(record: PersistedRecord) -> Self {
        Self {
            token: record.token,
            username: record.username,
            display_name: record.display_name,
            created_at: record.created_at,
        }
    }
}
