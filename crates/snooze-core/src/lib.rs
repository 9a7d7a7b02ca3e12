pub mod config;
pub mod error;
pub mod favorite;
pub mod remote;
pub mod session;
pub mod storage;
pub mod story;

#[cfg(any(test, feature = "testing"))]
pub mod fake;

// Re-export common error type
pub use error::StoryError;
