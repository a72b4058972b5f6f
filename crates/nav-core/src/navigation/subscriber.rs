//! Navigation subscriber trait

use super::{Key, StateChange};

/// Trait for components that need to observe committed state changes
pub trait NavigationSubscriber<K: Key>: Send + Sync {
    /// Called right before the change is handed to the render collaborator
    fn on_pre_change(&self, _change: &StateChange<K>) {}

    /// Called once the collaborator completed and the new stack is committed
    fn on_post_change(&self, change: &StateChange<K>);
}
