//! Error types for the Snooze client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for every Snooze crate.
///
/// Variants follow the failure taxonomy of the synchronization layer: remote
/// rejections (`Auth`), transport failures per operation family (`Catalog`,
/// `Favorite`), caller contract violations (`IllegalState`) and local
/// persistence problems (`Storage`).
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoryError {
    /// Credentials rejected, duplicate account or invalid signup input
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Story listing or creation failed at the transport layer
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Favorite mutation failed at the transport layer
    #[error("Favorite error: {0}")]
    Favorite(String),

    /// Operation invoked without its required state (e.g. no live session)
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// Local key/value storage failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON"
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StoryError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    pub fn catalog(message: impl Into<String>) -> Self {
        Self::Catalog(message.into())
    }

    pub fn favorite(message: impl Into<String>) -> Self {
        Self::Favorite(message.into())
    }

    pub fn illegal_state(message: impl Into<String>) -> Self {
        Self::IllegalState(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    pub fn is_catalog(&self) -> bool {
        matches!(self, Self::Catalog(_))
    }

    pub fn is_favorite(&self) -> bool {
        matches!(self, Self::Favorite(_))
    }

    pub fn is_illegal_state(&self) -> bool {
        matches!(self, Self::IllegalState(_))
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for StoryError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(format!("{} (kind: {:?})", err, err.kind()))
    }
}

impl From<serde_json::Error> for StoryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for StoryError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for StoryError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, StoryError>`.
pub type Result<T> = std::result::Result<T, StoryError>;
