//! View-based render collaborator for the navigation engine
//!
//! Views are plain data: a [`ViewFactory`] builds one per key, a
//! [`ViewContainer`] holds whatever is currently shown and a
//! [`ChangeHandler`] swaps the old view for the new one. [`ViewRenderer`]
//! ties these together and plugs into a `NavigationEngine` as its
//! render collaborator.

mod container;
mod error;
mod handlers;
mod key;
mod recording;
mod renderer;
mod scheduler;
mod state_store;
mod view;

pub use container::ViewContainer;
pub use error::RenderError;
pub use handlers::{ChangeHandler, FadeChangeHandler, HorizontalChangeHandler, InstantChangeHandler};
pub use key::{ChangeStyle, RenderableKey, ViewKey};
pub use recording::{DeferredRenderer, RecordingRenderer};
pub use renderer::{ViewChangeListener, ViewRenderer};
pub use scheduler::{CompletionScheduler, FinishFn, ImmediateScheduler};
pub use state_store::ViewStateStore;
pub use view::{View, ViewFactory};
