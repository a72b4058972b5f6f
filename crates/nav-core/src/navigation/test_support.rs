//! Collaborators and subscribers used by the unit tests

use super::{Completion, Key, NavigationEngine, NavigationSubscriber, RenderCollaborator, StateChange};
use crate::error::Result;
use parking_lot::Mutex;

/// Records every change and completes it right away
pub(crate) struct RecordingCollaborator<K> {
    changes: Mutex<Vec<StateChange<K>>>,
}

impl<K: Key> RecordingCollaborator<K> {
    pub(crate) fn new() -> Self {
        Self {
            changes: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn changes(&self) -> Vec<StateChange<K>> {
        self.changes.lock().clone()
    }

    pub(crate) fn clear(&self) {
        self.changes.lock().clear();
    }
}

impl<K: Key> RenderCollaborator<K> for RecordingCollaborator<K> {
    fn handle(
        &self,
        change: StateChange<K>,
        completion: Completion<K>,
        _engine: &NavigationEngine<K>,
    ) -> anyhow::Result<()> {
        self.changes.lock().push(change);
        completion.complete()?;
        Ok(())
    }
}

/// Holds completions until the test releases them
pub(crate) struct ManualCollaborator<K: Key> {
    received: Mutex<Vec<StateChange<K>>>,
    pending: Mutex<Vec<Completion<K>>>,
}

impl<K: Key> ManualCollaborator<K> {
    pub(crate) fn new() -> Self {
        Self {
            received: Mutex::new(Vec::new()),
            pending: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn received(&self) -> Vec<StateChange<K>> {
        self.received.lock().clone()
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.pending.lock().len()
    }

    /// Complete the oldest held transition
    pub(crate) fn complete_next(&self) -> Result<bool> {
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

    pub(crate) fn complete_all(&self) -> Result<()> {
        while self.complete_next()? {}
        Ok(())
    }
}

impl<K: Key> RenderCollaborator<K> for ManualCollaborator<K> {
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

/// Records subscriber callbacks as "pre Forward" / "post Forward" strings
pub(crate) struct RecordingSubscriber {
    events: Mutex<Vec<String>>,
}

impl RecordingSubscriber {
    pub(crate) fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }
}

impl<K: Key> NavigationSubscriber<K> for RecordingSubscriber {
    fn on_pre_change(&self, change: &StateChange<K>) {
        self.events.lock().push(format!("pre {:?}", change.direction()));
    }

    fn on_post_change(&self, change: &StateChange<K>) {
        self.events.lock().push(format!("post {:?}", change.direction()));
    }
}
