//! Application layer for Snooze.
//!
//! Coordinates the session, catalog and favorite components behind one
//! event handler and turns their state into a renderable view model.

pub mod event;
pub mod renderer;
pub mod view;
pub mod view_controller;

pub use event::UiEvent;
pub use renderer::Renderer;
pub use view::{NavItem, NavState, Panels, Profile, StoryRow, ViewModel, host_name};
pub use view_controller::ViewController;
