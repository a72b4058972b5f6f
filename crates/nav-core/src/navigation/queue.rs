//! FIFO of pending transitions with single-flight dispatch

use super::{Direction, Key, StateChange};
use std::collections::VecDeque;

/// Identifies one dispatch attempt of a transition
pub type TransitionId = u64;

/// Lifecycle of a queued transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionStatus {
    Enqueued,
    InProgress,
    Completed,
}

/// A request to move an engine to a new stack
#[derive(Debug, Clone)]
pub struct PendingTransition<K> {
    id: TransitionId,
    target_stack: Vec<K>,
    direction: Direction,
    is_initial_bind: bool,
    status: TransitionStatus,
    /// Snapshot handed to the collaborator, set on dispatch
    change: Option<StateChange<K>>,
}

impl<K: Key> PendingTransition<K> {
    pub fn id(&self) -> TransitionId {
        self.id
    }

    pub fn target_stack(&self) -> &[K] {
        &self.target_stack
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_initial_bind(&self) -> bool {
        self.is_initial_bind
    }

    pub fn status(&self) -> TransitionStatus {
        self.status
    }

    /// The change that was dispatched, or one rebuilt from the target
    pub fn into_change(self) -> StateChange<K> {
        match self.change {
            Some(change) => change,
            None => StateChange::new(Vec::new(), self.target_stack, self.direction),
        }
    }
}

/// Queue of transitions for a single engine
#[derive(Debug)]
pub struct TransitionQueue<K> {
    queue: VecDeque<PendingTransition<K>>,
    next_id: TransitionId,
}

impl<K> Default for TransitionQueue<K> {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
            next_id: 0,
        }
    }
}

impl<K: Key> TransitionQueue<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transition and return its id
    pub fn enqueue(
        &mut self,
        target_stack: Vec<K>,
        direction: Direction,
        is_initial_bind: bool,
    ) -> TransitionId {
        let id = self.fresh_id();
        self.queue.push_back(PendingTransition {
            id,
            target_stack,
            direction,
            is_initial_bind,
            status: TransitionStatus::Enqueued,
            change: None,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn head(&self) -> Option<&PendingTransition<K>> {
        self.queue.front()
    }

    /// Target of the most recently queued transition
    pub fn last_target(&self) -> Option<&[K]> {
        self.queue.back().map(|pending| pending.target_stack.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingTransition<K>> {
        self.queue.iter()
    }

    /// Mark the head in progress and build its state change
    ///
    /// Returns `None` when the queue is empty or the head is already in
    /// flight, which keeps at most one transition in progress.
    pub fn begin_head(&mut self, committed: &[K]) -> Option<(TransitionId, StateChange<K>)> {
        let head = self.queue.front_mut()?;
        if head.status != TransitionStatus::Enqueued {
            return None;
        }

        let previous = if head.is_initial_bind {
            Vec::new()
        } else {
            committed.to_vec()
        };
        let change = StateChange::new(previous, head.target_stack.clone(), head.direction);

        head.status = TransitionStatus::InProgress;
        head.change = Some(change.clone());
        Some((head.id, change))
    }

    /// Remove the head if it is the in-flight transition `id`
    pub fn complete_head(&mut self, id: TransitionId) -> Option<PendingTransition<K>> {
        if !self.is_in_flight(id) {
            return None;
        }
        let mut finished = self.queue.pop_front()?;
        finished.status = TransitionStatus::Completed;
        Some(finished)
    }

    pub fn is_in_flight(&self, id: TransitionId) -> bool {
        matches!(
            self.queue.front(),
            Some(head) if head.id == id && head.status == TransitionStatus::InProgress
        )
    }

    /// Put the in-flight head back to enqueued under a new id
    ///
    /// Completions issued for the old id are ignored afterwards.
    pub fn requeue_in_flight(&mut self) -> Option<TransitionId> {
        let in_flight = self.queue.front().map(|head| head.status) == Some(TransitionStatus::InProgress);
        if !in_flight {
            return None;
        }
        let id = self.fresh_id();
        let head = self.queue.front_mut()?;
        head.status = TransitionStatus::Enqueued;
        head.change = None;
        head.id = id;
        Some(id)
    }

    fn fresh_id(&mut self) -> TransitionId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}
