//! Collaborators that only record what they are asked to render

use nav_core::{Completion, Key, NavigationEngine, RenderCollaborator, StateChange};
use parking_lot::Mutex;

/// Records every change and completes it immediately
pub struct RecordingRenderer<K> {
    changes: Mutex<Vec<StateChange<K>>>,
}

impl<K: Key> Default for RecordingRenderer<K> {
    fn default() -> Self {
        Self {
            changes: Mutex::new(Vec::new()),
        }
    }
}

impl<K: Key> RecordingRenderer<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn changes(&self) -> Vec<StateChange<K>> {
        self.changes.lock().clone()
    }

    pub fn last_change(&self) -> Option<StateChange<K>> {
        self.changes.lock().last().cloned()
    }

    pub fn take_changes(&self) -> Vec<StateChange<K>> {
        std::mem::take(&mut *self.changes.lock())
    }
}

impl<K: Key> RenderCollaborator<K> for RecordingRenderer<K> {
    fn handle(
        &self,
        change: StateChange<K>,
        completion: Completion<K>,
        _engine: &NavigationEngine<K>,
    ) -> anyhow::Result<()> {
        tracing::debug!("Recorded {:?} change to {:?}", change.direction(), change.new_stack());
        self.changes.lock().push(change);
        completion.complete()?;
        Ok(())
    }
}

/// Holds every completion until told to release it
///
/// Stands in for an animation that finishes some time after the change
/// was handed over.
pub struct DeferredRenderer<K: Key> {
    received: Mutex<Vec<StateChange<K>>>,
    pending: Mutex<Vec<Completion<K>>>,
}

impl<K: Key> Default for DeferredRenderer<K> {
    fn default() -> Self {
        Self {
            received: Mutex::new(Vec::new()),
            pending: Mutex::new(Vec::new()),
        }
    }
}

impl<K: Key> DeferredRenderer<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn received(&self) -> Vec<StateChange<K>> {
        self.received.lock().clone()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Complete the oldest held change; `false` when nothing is held
    pub fn complete_next(&self) -> nav_core::Result<bool> {
        let next = {
            let mut pending = self.pending.lock();
            if pending.is_empty() {
                None
            } else {
                Some(pending.remove(0))
            }
        };
        match next {
            Some(completion) => completion.complete().map(|_| true),
            None => Ok(false),
        }
    }

    /// Keep completing until nothing is held, including changes that arrive meanwhile
    pub fn complete_all(&self) -> nav_core::Result<usize> {
        let mut completed = 0;
        while self.complete_next()? {
            completed += 1;
        }
        Ok(completed)
    }
}

impl<K: Key> RenderCollaborator<K> for DeferredRenderer<K> {
    fn handle(
        &self,
        change: StateChange<K>,
        completion: Completion<K>,
        _engine: &NavigationEngine<K>,
    ) -> anyhow::Result<()> {
        self.received.lock().push(change);
        self.pending.lock().push(completion);
        Ok(())
    }
}
