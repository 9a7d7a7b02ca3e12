//! File-backed storage.

pub mod atomic_toml;
pub mod file_kv_store;

pub use atomic_toml::AtomicTomlFile;
pub use file_kv_store::FileKeyValueStore;
