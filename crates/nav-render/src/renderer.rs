//! Render collaborator that maps each stack top to a view

use crate::container::ViewContainer;
use crate::handlers::ChangeHandler;
use crate::key::ViewKey;
use crate::scheduler::{CompletionScheduler, ImmediateScheduler};
use crate::state_store::ViewStateStore;
use crate::view::ViewFactory;
use nav_core::{Completion, Direction, NavigationEngine, NavigationError, RenderCollaborator, StateChange};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Observes view swaps performed by a [`ViewRenderer`]
pub trait ViewChangeListener<K>: Send + Sync {
    fn on_view_change_started(&self, _previous: Option<&K>, _new: Option<&K>) {}

    fn on_view_change_completed(&self, previous: Option<&K>, new: Option<&K>);
}

/// Shows the top of the stack as a single view
///
/// The outgoing view's state is saved under its key and handed back to the
/// next view created for that key, as long as the key stays on the stack.
pub struct ViewRenderer<K: ViewKey> {
    factory: Arc<dyn ViewFactory<K>>,
    container: Arc<Mutex<ViewContainer>>,
    states: Mutex<ViewStateStore<K>>,
    scheduler: Arc<dyn CompletionScheduler>,
    listeners: Mutex<Vec<Arc<dyn ViewChangeListener<K>>>>,
}

impl<K: ViewKey> ViewRenderer<K> {
    pub fn new(factory: Arc<dyn ViewFactory<K>>) -> Self {
        Self {
            factory,
            container: Arc::new(Mutex::new(ViewContainer::new())),
            states: Mutex::new(ViewStateStore::new()),
            scheduler: Arc::new(ImmediateScheduler),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Render into an existing container
    pub fn with_container(mut self, container: Arc<Mutex<ViewContainer>>) -> Self {
        self.container = container;
        self
    }

    pub fn with_scheduler(mut self, scheduler: Arc<dyn CompletionScheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn container(&self) -> Arc<Mutex<ViewContainer>> {
        Arc::clone(&self.container)
    }

    pub fn saved_states(&self) -> ViewStateStore<K> {
        self.states.lock().clone()
    }

    pub fn add_listener(&self, listener: Arc<dyn ViewChangeListener<K>>) {
        self.listeners.lock().push(listener);
    }

    /// Forward uses the new key's style, backward the previous key's
    fn handler_for(change: &StateChange<K>) -> &'static dyn ChangeHandler {
        let styled = match change.direction() {
            Direction::Forward => change.top_new(),
            Direction::Backward => change.top_previous(),
            Direction::Replace => None,
        };
        let style = styled
            .and_then(|key| key.as_renderable())
            .map(|renderable| renderable.change_style())
            .unwrap_or_default();
        <dyn ChangeHandler>::for_style(style)
    }

    /// Notify listeners and complete once the scheduler says so
    fn finish(&self, change: StateChange<K>, completion: Completion<K>, delay: Duration) -> anyhow::Result<()> {
        let listeners = self.listeners.lock().clone();
        self.scheduler.schedule(
            delay,
            Box::new(move || {
                for listener in &listeners {
                    listener.on_view_change_completed(change.top_previous(), change.top_new());
                }
                completion.complete()?;
                Ok(())
            }),
        )
    }
}

impl<K: ViewKey> RenderCollaborator<K> for ViewRenderer<K> {
    fn handle(
        &self,
        change: StateChange<K>,
        completion: Completion<K>,
        engine: &NavigationEngine<K>,
    ) -> anyhow::Result<()> {
        let Some(new_key) = change.top_new().cloned() else {
            let mut container = self.container.lock();
            if !container.is_empty() {
                container.clear();
            }
            drop(container);
            self.states.lock().clear();
            tracing::debug!("Stack is empty, cleared view container");
            return self.finish(change, completion, Duration::ZERO);
        };

        let renderable = new_key
            .as_renderable()
            .ok_or_else(|| NavigationError::unsupported_key(&new_key, "RenderableKey"))?;

        let previous_key = change.top_previous().cloned();
        let has_view = !self.container.lock().is_empty();
        if has_view && previous_key.as_ref() == Some(&new_key) {
            // Same view stays on screen
            return self.finish(change, completion, Duration::ZERO);
        }

        let listeners = self.listeners.lock().clone();
        for listener in &listeners {
            listener.on_view_change_started(previous_key.as_ref(), Some(&new_key));
        }

        let mut new_view = self.factory.create_view(&new_key, renderable, engine)?;
        let handler = Self::handler_for(&change);

        if let Some(state) = self.states.lock().get(&new_key) {
            new_view.restore_state(state)?;
        }

        let (delay, previous_state) = {
            let mut container = self.container.lock();
            let previous_view = if change.previous_stack().is_empty() {
                if !container.is_empty() {
                    container.clear();
                }
                None
            } else {
                container.take_current()
            };

            match previous_view {
                Some(previous) => {
                    tracing::debug!(
                        "Changing view {} -> {} with {} handler",
                        previous.name(),
                        new_view.name(),
                        handler.name()
                    );
                    let previous_state = previous.save_state();
                    if let Err(err) =
                        handler.perform_change(&mut container, &*previous, new_view, change.direction())
                    {
                        container.add_view(previous);
                        return Err(err);
                    }
                    (handler.duration(), Some(previous_state))
                }
                None => {
                    container.add_view(new_view);
                    (Duration::ZERO, None)
                }
            }
        };

        {
            let mut states = self.states.lock();
            if let (Some(state), Some(key)) = (previous_state, previous_key) {
                states.save(key, state);
            }
            states.retain_stack(change.new_stack());
        }

        self.finish(change, completion, delay)
    }
}
