//! Favorite domain module.
//!
//! - `state`: `FavoriteMark` and the per-story `FavoriteState` machine
//! - `controller`: `FavoriteController`, optimistic toggling with rollback

mod controller;
mod state;

pub use controller::{FavoriteController, PendingToggle};
pub use state::{FavoriteMark, FavoriteState};
