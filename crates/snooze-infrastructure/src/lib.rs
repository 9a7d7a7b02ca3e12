pub mod config_service;
pub mod http_remote;
pub mod paths;
pub mod storage;

pub use config_service::ConfigService;
pub use http_remote::HttpRemoteService;
pub use paths::SnoozePaths;
pub use storage::{AtomicTomlFile, FileKeyValueStore};
