//! Boundary to the component that actually swaps visible content

use super::engine::{EngineCell, NavigationEngine};
use super::{Key, StateChange, TransitionId};
use crate::error::Result;
use std::fmt;
use std::sync::Weak;

/// Performs the visual side of a state change
///
/// Implementations must call [`Completion::complete`] exactly once, either
/// before returning from [`RenderCollaborator::handle`] or at any later
/// point. Until then the engine will not start another transition.
/// Returning an error means the change could not be started; the engine
/// keeps the transition queued and detaches the collaborator.
pub trait RenderCollaborator<K: Key>: Send + Sync {
    fn handle(
        &self,
        change: StateChange<K>,
        completion: Completion<K>,
        engine: &NavigationEngine<K>,
    ) -> anyhow::Result<()>;
}

impl<K, F> RenderCollaborator<K> for F
where
    K: Key,
    F: Fn(StateChange<K>, Completion<K>, &NavigationEngine<K>) -> anyhow::Result<()> + Send + Sync,
{
    fn handle(
        &self,
        change: StateChange<K>,
        completion: Completion<K>,
        engine: &NavigationEngine<K>,
    ) -> anyhow::Result<()> {
        self(change, completion, engine)
    }
}

/// Completion handle for one dispatched transition
///
/// Consumed by [`Completion::complete`], so it can fire at most once.
pub struct Completion<K: Key> {
    engine: Weak<EngineCell<K>>,
    transition: TransitionId,
    fired: bool,
}

impl<K: Key> Completion<K> {
    pub(crate) fn new(engine: Weak<EngineCell<K>>, transition: TransitionId) -> Self {
        Self {
            engine,
            transition,
            fired: false,
        }
    }

    pub fn transition_id(&self) -> TransitionId {
        self.transition
    }

    /// Signal that the visual change is done
    ///
    /// Commits the new stack and starts the next queued transition. Errors
    /// come from whatever the next dispatch ran into.
    pub fn complete(mut self) -> Result<()> {
        self.fired = true;
        match self.engine.upgrade() {
            Some(cell) => NavigationEngine::from_cell(cell).finish_transition(self.transition),
            None => {
                tracing::debug!("Engine dropped before transition {} completed", self.transition);
                Ok(())
            }
        }
    }
}

impl<K: Key> Drop for Completion<K> {
    fn drop(&mut self) {
        if !self.fired {
            tracing::warn!(
                "Transition {} dropped without completing, its engine stays blocked",
                self.transition
            );
        }
    }
}

impl<K: Key> fmt::Debug for Completion<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("transition", &self.transition)
            .field("fired", &self.fired)
            .finish()
    }
}
