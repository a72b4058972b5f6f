use serde::{Deserialize, Serialize};
use std::fmt;

mod collaborator;
mod engine;
mod indexer;
mod queue;
mod subscriber;

#[cfg(test)]
pub(crate) mod test_support;

pub use collaborator::{Completion, RenderCollaborator};
pub use engine::NavigationEngine;
pub use indexer::OrderingIndexer;
pub use queue::{PendingTransition, TransitionId, TransitionQueue, TransitionStatus};
pub use subscriber::NavigationSubscriber;

/// Identifier of a navigable destination
///
/// The engine only compares, clones and prints keys. Persistence goes
/// through a [`crate::KeyCodec`].
pub trait Key: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {}

impl<T> Key for T where T: Clone + PartialEq + fmt::Debug + Send + Sync + 'static {}

/// How a transition moves through the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// A key was appended
    Forward,
    /// One or more keys were removed from the top
    Backward,
    /// The top changed identity without net motion
    Replace,
}

/// Snapshot handed to the render collaborator for a single transition
#[derive(Debug, Clone, PartialEq)]
pub struct StateChange<K> {
    previous_stack: Vec<K>,
    new_stack: Vec<K>,
    direction: Direction,
}

impl<K> StateChange<K> {
    pub fn new(previous_stack: Vec<K>, new_stack: Vec<K>, direction: Direction) -> Self {
        Self {
            previous_stack,
            new_stack,
            direction,
        }
    }

    /// Stack that was visible before the change; empty means "create everything fresh"
    pub fn previous_stack(&self) -> &[K] {
        &self.previous_stack
    }

    /// Stack that must be visible once the change completes
    pub fn new_stack(&self) -> &[K] {
        &self.new_stack
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn top_previous(&self) -> Option<&K> {
        self.previous_stack.last()
    }

    pub fn top_new(&self) -> Option<&K> {
        self.new_stack.last()
    }
}
