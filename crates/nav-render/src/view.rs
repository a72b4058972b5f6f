use crate::error::RenderError;
use crate::key::RenderableKey;
use nav_core::NavigationEngine;
use serde_json::Value;

/// Content shown for one key
pub trait View: Send {
    fn name(&self) -> &str;

    /// Text representation of the current content
    fn render(&self) -> String;

    /// State to keep while the view is off screen
    fn save_state(&self) -> Value {
        Value::Null
    }

    fn restore_state(&mut self, _state: &Value) -> Result<(), RenderError> {
        Ok(())
    }
}

/// Builds the view for a key
///
/// `engine` is the engine being rendered, so a view may create child
/// engines scoped to its key.
pub trait ViewFactory<K: nav_core::Key>: Send + Sync {
    fn create_view(
        &self,
        key: &K,
        renderable: &dyn RenderableKey,
        engine: &NavigationEngine<K>,
    ) -> anyhow::Result<Box<dyn View>>;
}

impl<K, F> ViewFactory<K> for F
where
    K: nav_core::Key,
    F: Fn(&K, &dyn RenderableKey, &NavigationEngine<K>) -> anyhow::Result<Box<dyn View>> + Send + Sync,
{
    fn create_view(
        &self,
        key: &K,
        renderable: &dyn RenderableKey,
        engine: &NavigationEngine<K>,
    ) -> anyhow::Result<Box<dyn View>> {
        self(key, renderable, engine)
    }
}
