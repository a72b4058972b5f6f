//! Demo destinations and the views shown for them

use anyhow::Result;
use nav_core::NavigationEngine;
use nav_render::{
    ChangeStyle, CompletionScheduler, RenderError, RenderableKey, View, ViewContainer, ViewFactory, ViewKey,
    ViewRenderer,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Tags of the two child engines hosted by the split screen
pub const SPLIT_TAGS: [&str; 2] = ["top", "bottom"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DemoKey {
    Home,
    Counter(u32),
    Split,
}

impl RenderableKey for DemoKey {
    fn view_name(&self) -> String {
        match self {
            DemoKey::Home => "home".to_string(),
            DemoKey::Counter(n) => format!("counter-{}", n),
            DemoKey::Split => "split".to_string(),
        }
    }

    fn change_style(&self) -> ChangeStyle {
        match self {
            DemoKey::Home => ChangeStyle::Instant,
            DemoKey::Counter(_) => ChangeStyle::Horizontal,
            DemoKey::Split => ChangeStyle::Fade,
        }
    }
}

impl ViewKey for DemoKey {
    fn as_renderable(&self) -> Option<&dyn RenderableKey> {
        Some(self)
    }
}

struct HomeView;

impl View for HomeView {
    fn name(&self) -> &str {
        "home"
    }

    fn render(&self) -> String {
        "Home".to_string()
    }
}

/// Counts how often the user came back to it
struct CounterView {
    name: String,
    number: u32,
    returns: u64,
}

impl View for CounterView {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self) -> String {
        format!("Counter {} (returned {} times)", self.number, self.returns)
    }

    fn save_state(&self) -> Value {
        Value::from(self.returns)
    }

    fn restore_state(&mut self, state: &Value) -> Result<(), RenderError> {
        let returns = state.as_u64().ok_or_else(|| RenderError::InvalidState {
            view: self.name.clone(),
            reason: format!("expected a number, got {}", state),
        })?;
        self.returns = returns + 1;
        Ok(())
    }
}

/// Shows two child engines side by side
struct SplitView {
    panes: Vec<(String, NavigationEngine<DemoKey>, Arc<Mutex<ViewContainer>>)>,
}

impl View for SplitView {
    fn name(&self) -> &str {
        "split"
    }

    fn render(&self) -> String {
        let mut out = "Split".to_string();
        for (tag, engine, container) in &self.panes {
            out.push_str(&format!("\n  [{}] {:?}: {}", tag, engine.stack(), container.lock().render()));
        }
        out
    }
}

impl Drop for SplitView {
    fn drop(&mut self) {
        // Child engines outlive the view while Split stays on the stack
        for (_, engine, _) in &self.panes {
            engine.remove_render_collaborator();
        }
    }
}

/// Builds views for [`DemoKey`]s
#[derive(Clone)]
pub struct DemoViewFactory {
    scheduler: Arc<dyn CompletionScheduler>,
}

impl DemoViewFactory {
    pub fn new(scheduler: Arc<dyn CompletionScheduler>) -> Self {
        Self { scheduler }
    }

    /// Renderer for an engine, sharing this factory and its scheduler
    pub fn renderer(&self) -> ViewRenderer<DemoKey> {
        ViewRenderer::new(Arc::new(self.clone())).with_scheduler(Arc::clone(&self.scheduler))
    }

    fn split_view(&self, engine: &NavigationEngine<DemoKey>) -> Result<SplitView> {
        let mut panes = Vec::with_capacity(SPLIT_TAGS.len());
        for tag in SPLIT_TAGS {
            let child = engine.get_child_engine(&DemoKey::Split, tag)?;
            let renderer = Arc::new(self.renderer());
            let container = renderer.container();
            child.set_render_collaborator(renderer)?;
            if !child.has_root() && !child.has_pending_transition() {
                child.set_root(DemoKey::Counter(1))?;
            }
            panes.push((tag.to_string(), child, container));
        }
        Ok(SplitView { panes })
    }
}

impl ViewFactory<DemoKey> for DemoViewFactory {
    fn create_view(
        &self,
        key: &DemoKey,
        renderable: &dyn RenderableKey,
        engine: &NavigationEngine<DemoKey>,
    ) -> Result<Box<dyn View>> {
        let view: Box<dyn View> = match key {
            DemoKey::Home => Box::new(HomeView),
            DemoKey::Counter(number) => Box::new(CounterView {
                name: renderable.view_name(),
                number: *number,
                returns: 0,
            }),
            DemoKey::Split => Box::new(self.split_view(engine)?),
        };
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nav_render::ImmediateScheduler;

    fn setup() -> (NavigationEngine<DemoKey>, Arc<ViewRenderer<DemoKey>>) {
        let factory = DemoViewFactory::new(Arc::new(ImmediateScheduler));
        let engine: NavigationEngine<DemoKey> = NavigationEngine::with_tag("main");
        let renderer = Arc::new(factory.renderer());
        engine.set_render_collaborator(renderer.clone()).unwrap();
        (engine, renderer)
    }

    #[test]
    fn test_counter_counts_returns() {
        let (engine, renderer) = setup();
        engine.set_root(DemoKey::Home).unwrap();
        engine.push(DemoKey::Counter(1)).unwrap();
        engine.push(DemoKey::Counter(2)).unwrap();
        engine.pop().unwrap();
        assert_eq!(renderer.container().lock().render(), "Counter 1 (returned 1 times)");
    }

    #[test]
    fn test_split_starts_children_at_first_counter() {
        let (engine, renderer) = setup();
        engine.set_root(DemoKey::Home).unwrap();
        engine.push(DemoKey::Split).unwrap();

        let children = engine.children();
        assert_eq!(children.len(), 2);
        for child in &children {
            assert_eq!(child.stack(), vec![DemoKey::Counter(1)]);
            assert!(child.has_render_collaborator());
        }
        assert!(renderer.container().lock().render().contains("[top] [Counter(1)]"));
    }

    #[test]
    fn test_back_goes_to_most_recent_split_pane() {
        let (engine, _renderer) = setup();
        engine.set_root(DemoKey::Split).unwrap();
        let top = engine.get_child_engine(&DemoKey::Split, "top").unwrap();
        let bottom = engine.get_child_engine(&DemoKey::Split, "bottom").unwrap();

        top.push(DemoKey::Counter(2)).unwrap();
        bottom.push(DemoKey::Counter(3)).unwrap();

        assert!(engine.handle_back().unwrap());
        assert_eq!(bottom.stack(), vec![DemoKey::Counter(1)]);
        assert_eq!(top.stack(), vec![DemoKey::Counter(1), DemoKey::Counter(2)]);

        assert!(engine.handle_back().unwrap());
        assert_eq!(top.stack(), vec![DemoKey::Counter(1)]);
        assert!(!engine.handle_back().unwrap());
    }

    #[test]
    fn test_leaving_split_destroys_panes() {
        let (engine, _renderer) = setup();
        engine.set_root(DemoKey::Home).unwrap();
        engine.push(DemoKey::Split).unwrap();
        let top = engine.get_child_engine(&DemoKey::Split, "top").unwrap();

        engine.pop().unwrap();
        assert!(engine.children().is_empty());
        assert!(top.stack().is_empty());
    }
}
