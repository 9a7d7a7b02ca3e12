use crate::view::ViewModel;

/// Draws a [`ViewModel`]. Called after every state change.
pub trait Renderer: Send + Sync {
    fn render(&self, view: &ViewModel);
}
