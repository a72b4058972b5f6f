//! Capabilities a key needs before it can be rendered as a view

use nav_core::Key;
use serde::{Deserialize, Serialize};

/// Animation used when a key's view enters or leaves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChangeStyle {
    #[default]
    Instant,
    Fade,
    Horizontal,
}

/// A key that knows which view it shows
pub trait RenderableKey {
    /// Name of the view to build for this key
    fn view_name(&self) -> String;

    fn change_style(&self) -> ChangeStyle {
        ChangeStyle::Instant
    }
}

/// Key type accepted by [`crate::ViewRenderer`]
///
/// Not every value of a key type has to be renderable. Values that return
/// `None` make the renderer fail with `NavigationError::UnsupportedKey`.
pub trait ViewKey: Key {
    fn as_renderable(&self) -> Option<&dyn RenderableKey>;
}
