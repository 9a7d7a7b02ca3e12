//! Story domain module.
//!
//! - `model`: `Story` and the `NewStory` submission payload
//! - `catalog`: `StoryCatalog`, the replaceable snapshot of the remote list

mod catalog;
mod model;

pub use catalog::{CatalogSnapshot, StoryCatalog};
pub use model::{NewStory, Story};
