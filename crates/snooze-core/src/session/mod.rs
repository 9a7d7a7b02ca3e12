//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: Session, remote account payload and persisted record
//! - `store`: Credential mirror over a key/value namespace (`PersistentCredentialStore`)
//! - `manager`: Session lifecycle and synchronization (`SessionManager`)
//!
//! # Usage
//!
//! ```ignore
//! use snooze_core::session::{Session, SessionManager, PersistentCredentialStore};
//! ```

mod manager;
mod model;
pub mod store;

// Re-export public API
pub use manager::SessionManager;
pub use model::{Account, PersistedRecord, Session};
pub use store::{PersistentCredentialStore, StoredCredentials};
