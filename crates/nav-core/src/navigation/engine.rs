//! Navigation engine implementation

use super::collaborator::{Completion, RenderCollaborator};
use super::indexer::OrderingIndexer;
use super::queue::{TransitionId, TransitionQueue};
use super::subscriber::NavigationSubscriber;
use super::{Direction, Key, StateChange};
use crate::error::{NavigationError, Result};
use crate::persistence::{KeyCodec, SavedEngineState};
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};

/// Mutable engine state stored internally
struct EngineState<K: Key> {
    stack: Vec<K>,
    queue: TransitionQueue<K>,
    children: Vec<NavigationEngine<K>>,
    collaborator: Option<Arc<dyn RenderCollaborator<K>>>,
    subscribers: Vec<Weak<dyn NavigationSubscriber<K>>>,
    /// One token per forward transition still represented in the stack
    ordering_indices: Vec<u64>,
    foreground: bool,
}

impl<K: Key> EngineState<K> {
    fn new(foreground: bool) -> Self {
        Self {
            stack: Vec::new(),
            queue: TransitionQueue::new(),
            children: Vec::new(),
            collaborator: None,
            subscribers: Vec::new(),
            ordering_indices: Vec::new(),
            foreground,
        }
    }

    /// Stack the next operation builds on: the last queued target, else the committed stack
    fn active_stack(&self) -> &[K] {
        self.queue.last_target().unwrap_or(&self.stack)
    }

    fn enqueue(&mut self, target: Vec<K>, direction: Direction, initial_bind: bool) {
        let id = self.queue.enqueue(target, direction, initial_bind);
        tracing::debug!(
            "Enqueued transition {} ({:?}, initial bind: {}), {} queued",
            id,
            direction,
            initial_bind,
            self.queue.len()
        );
    }

    fn live_subscribers(&mut self) -> Vec<Arc<dyn NavigationSubscriber<K>>> {
        // Remove any dead weak references
        self.subscribers.retain(|weak| weak.strong_count() > 0);
        self.subscribers.iter().filter_map(Weak::upgrade).collect()
    }
}

/// Shared cell behind every engine handle
pub(crate) struct EngineCell<K: Key> {
    owner_key: Option<K>,
    scope_tag: String,
    parent: Weak<EngineCell<K>>,
    /// Present on tree roots only
    indexer: Option<OrderingIndexer>,
    state: Mutex<EngineState<K>>,
}

/// The backstack state machine
///
/// Cloning an engine yields another handle to the same instance. A parent
/// engine owns its children; children only keep a weak link upwards.
///
/// The engine never holds its own lock while calling into a collaborator, a
/// subscriber or another engine, so collaborators may complete
/// synchronously and may create child engines from inside
/// [`RenderCollaborator::handle`].
pub struct NavigationEngine<K: Key> {
    cell: Arc<EngineCell<K>>,
}

impl<K: Key> Clone for NavigationEngine<K> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<K: Key> Default for NavigationEngine<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key> NavigationEngine<K> {
    /// Create a new root engine with an empty scope tag
    pub fn new() -> Self {
        Self::with_tag("")
    }

    /// Create a new root engine
    pub fn with_tag(tag: impl Into<String>) -> Self {
        Self {
            cell: Arc::new(EngineCell {
                owner_key: None,
                scope_tag: tag.into(),
                parent: Weak::new(),
                indexer: Some(OrderingIndexer::new()),
                state: Mutex::new(EngineState::new(true)),
            }),
        }
    }

    fn new_child(parent: &Self, owner_key: K, tag: String, foreground: bool) -> Self {
        Self {
            cell: Arc::new(EngineCell {
                owner_key: Some(owner_key),
                scope_tag: tag,
                parent: Arc::downgrade(&parent.cell),
                indexer: None,
                state: Mutex::new(EngineState::new(foreground)),
            }),
        }
    }

    pub(crate) fn from_cell(cell: Arc<EngineCell<K>>) -> Self {
        Self { cell }
    }

    // ------------------------------------------------------------------
    // Stack mutation
    // ------------------------------------------------------------------

    /// Navigate to `key`
    ///
    /// Pushing the visible top re-issues the same stack as a replace.
    /// Pushing a key that is already deeper in the stack pops everything
    /// above it instead of adding a duplicate; the dropped entries are
    /// discarded without any hook.
    pub fn push(&self, key: K) -> Result<()> {
        {
            let mut state = self.cell.state.lock();
            let active = state.active_stack();

            let (target, direction) = if active.last() == Some(&key) {
                (active.to_vec(), Direction::Replace)
            } else if let Some(position) = active.iter().position(|k| *k == key) {
                (active[..=position].to_vec(), Direction::Backward)
            } else {
                let mut target = active.to_vec();
                target.push(key);
                (target, Direction::Forward)
            };

            state.enqueue(target, direction, false);
        }
        self.begin_if_possible()
    }

    /// Remove the top entry
    ///
    /// Returns `true` if a pop was enqueued or a transition is already
    /// pending, `false` if there is nothing left to pop.
    pub fn pop(&self) -> Result<bool> {
        {
            let mut state = self.cell.state.lock();
            if !state.queue.is_empty() {
                return Ok(true);
            }
            if state.stack.len() <= 1 {
                return Ok(false);
            }

            let mut target = state.stack.clone();
            target.pop();
            state.enqueue(target, Direction::Backward, false);
        }
        self.begin_if_possible()?;
        Ok(true)
    }

    /// Swap the top entry for `key`
    pub fn replace_top(&self, key: K) -> Result<()> {
        {
            let mut state = self.cell.state.lock();
            let mut target = state.active_stack().to_vec();
            target.pop();
            target.push(key);
            state.enqueue(target, Direction::Replace, false);
        }
        self.begin_if_possible()
    }

    /// Replace the whole stack with a single entry
    pub fn set_root(&self, key: K) -> Result<()> {
        {
            let mut state = self.cell.state.lock();
            let direction = match state.active_stack().len() {
                0 => Direction::Forward,
                1 => Direction::Replace,
                _ => Direction::Backward,
            };
            state.enqueue(vec![key], direction, false);
        }
        self.begin_if_possible()
    }

    /// Replace the whole stack, with the caller choosing the direction
    pub fn set_stack(&self, stack: Vec<K>, direction: Direction) -> Result<()> {
        self.cell.state.lock().enqueue(stack, direction, false);
        self.begin_if_possible()
    }

    /// Route a back request through the tree
    ///
    /// Child engines owned by the top entry that have a collaborator get
    /// the first chance, most recently advanced first. If none of them
    /// consumes it, this engine pops.
    pub fn handle_back(&self) -> Result<bool> {
        let candidates: Vec<NavigationEngine<K>> = {
            let state = self.cell.state.lock();
            let Some(top) = state.stack.last() else {
                return Ok(false);
            };
            state
                .children
                .iter()
                .filter(|child| child.cell.owner_key.as_ref() == Some(top))
                .cloned()
                .collect()
        };

        let mut candidates: Vec<(Option<u64>, NavigationEngine<K>)> = candidates
            .into_iter()
            .filter(|child| child.has_render_collaborator())
            .map(|child| (child.latest_ordering_token(), child))
            .collect();
        // Children without any token sort last
        candidates.sort_by(|a, b| b.0.cmp(&a.0));

        for (_, child) in candidates {
            if child.handle_back()? {
                return Ok(true);
            }
        }

        self.pop()
    }

    // ------------------------------------------------------------------
    // Engine tree
    // ------------------------------------------------------------------

    /// Get or create the child engine scoped to `key` and `tag`
    ///
    /// `key` must be on the active stack.
    pub fn get_child_engine(&self, key: &K, tag: &str) -> Result<NavigationEngine<K>> {
        let mut state = self.cell.state.lock();
        if !state.active_stack().contains(key) {
            return Err(NavigationError::key_not_in_stack(key));
        }

        if let Some(existing) = state.children.iter().find(|child| child.is_scoped_to(key, tag)) {
            return Ok(existing.clone());
        }

        let child = Self::new_child(self, key.clone(), tag.to_string(), state.foreground);
        state.children.push(child.clone());
        tracing::debug!("Created child engine {:?}/{:?}", key, tag);
        Ok(child)
    }

    /// [`Self::get_child_engine`] with the default empty tag
    pub fn get_child_engine_default(&self, key: &K) -> Result<NavigationEngine<K>> {
        self.get_child_engine(key, "")
    }

    /// Destroy and detach the child scoped to `key` and `tag`
    pub fn remove_child_engine(&self, key: &K, tag: &str) -> Result<bool> {
        let child = {
            let state = self.cell.state.lock();
            state.children.iter().find(|child| child.is_scoped_to(key, tag)).cloned()
        };
        match child {
            Some(child) => self.destroy_and_detach(&child).map(|_| true),
            None => Ok(false),
        }
    }

    /// Destroy and detach `child` if it belongs to this engine
    pub fn remove_child(&self, child: &NavigationEngine<K>) -> Result<bool> {
        match child.owner_key() {
            Some(key) => self.remove_child_engine(key, child.scope_tag()),
            None => Ok(false),
        }
    }

    fn destroy_and_detach(&self, child: &NavigationEngine<K>) -> Result<()> {
        // Tear down first, then drop the parent's ownership
        let result = child.destroy();
        self.cell
            .state
            .lock()
            .children
            .retain(|existing| !existing.same_engine(child));
        result
    }

    fn is_scoped_to(&self, key: &K, tag: &str) -> bool {
        self.cell.owner_key.as_ref() == Some(key) && self.cell.scope_tag == tag
    }

    /// Whether both handles point at the same engine instance
    pub fn same_engine(&self, other: &NavigationEngine<K>) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }

    pub fn owner_key(&self) -> Option<&K> {
        self.cell.owner_key.as_ref()
    }

    pub fn scope_tag(&self) -> &str {
        &self.cell.scope_tag
    }

    pub fn is_root(&self) -> bool {
        self.cell.owner_key.is_none()
    }

    pub fn parent(&self) -> Option<NavigationEngine<K>> {
        self.cell.parent.upgrade().map(Self::from_cell)
    }

    /// Top-most engine reachable through parent links
    pub fn root(&self) -> NavigationEngine<K> {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    pub fn children(&self) -> Vec<NavigationEngine<K>> {
        self.cell.state.lock().children.clone()
    }

    // ------------------------------------------------------------------
    // Collaborators and subscribers
    // ------------------------------------------------------------------

    /// Attach the render collaborator
    ///
    /// With nothing pending the committed stack is re-issued as an initial
    /// bind so a fresh surface can rebuild itself. Otherwise the queue is
    /// drained.
    pub fn set_render_collaborator(&self, collaborator: Arc<dyn RenderCollaborator<K>>) -> Result<()> {
        {
            let mut state = self.cell.state.lock();
            state.collaborator = Some(collaborator);
            if state.queue.is_empty() {
                let stack = state.stack.clone();
                state.enqueue(stack, Direction::Replace, true);
            }
        }
        self.begin_if_possible()
    }

    pub fn remove_render_collaborator(&self) {
        self.cell.state.lock().collaborator = None;
    }

    pub fn has_render_collaborator(&self) -> bool {
        self.cell.state.lock().collaborator.is_some()
    }

    /// Add a subscriber; it is held weakly and added only once
    pub fn add_subscriber(&self, subscriber: Arc<dyn NavigationSubscriber<K>>) {
        let weak = Arc::downgrade(&subscriber);
        let mut state = self.cell.state.lock();
        if !state.subscribers.iter().any(|existing| existing.ptr_eq(&weak)) {
            state.subscribers.push(weak);
        }
    }

    pub fn remove_subscriber(&self, subscriber: &Arc<dyn NavigationSubscriber<K>>) {
        let weak = Arc::downgrade(subscriber);
        self.cell
            .state
            .lock()
            .subscribers
            .retain(|existing| !existing.ptr_eq(&weak));
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Resume dispatching, here and in every child
    pub fn set_foreground(&self) -> Result<()> {
        let children = {
            let mut state = self.cell.state.lock();
            state.foreground = true;
            state.children.clone()
        };
        self.begin_if_possible()?;
        for child in children {
            child.set_foreground()?;
        }
        Ok(())
    }

    /// Suspend dispatching, here and in every child; enqueuing still works
    pub fn set_background(&self) {
        let children = {
            let mut state = self.cell.state.lock();
            state.foreground = false;
            state.children.clone()
        };
        for child in children {
            child.set_background();
        }
    }

    /// The host window went away
    ///
    /// Collaborators are detached everywhere in the subtree. Stacks and
    /// queues stay, and a transition that was in flight is queued again so
    /// the next collaborator picks it up.
    pub fn on_host_destroyed(&self) {
        let children = {
            let mut state = self.cell.state.lock();
            state.collaborator = None;
            if let Some(id) = state.queue.requeue_in_flight() {
                tracing::debug!("Requeued in-flight transition as {}", id);
            }
            state.children.clone()
        };
        for child in children {
            child.on_host_destroyed();
        }
    }

    /// Tear the engine down
    ///
    /// Children go first. Then an empty stack is enqueued so rendered
    /// content is cleared, and the collaborator is detached.
    pub fn destroy(&self) -> Result<()> {
        let children = self.children();
        let mut result = Ok(());
        for child in &children {
            if let Err(err) = child.destroy() {
                result = Err(err);
            }
        }

        self.cell.state.lock().children.clear();
        let cleared = self.set_stack(Vec::new(), Direction::Replace);
        self.remove_render_collaborator();

        tracing::debug!("Destroyed engine {:?}/{:?}", self.cell.owner_key, self.cell.scope_tag);
        result.and(cleared)
    }

    pub fn is_foreground(&self) -> bool {
        self.cell.state.lock().foreground
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Committed stack
    pub fn stack(&self) -> Vec<K> {
        self.cell.state.lock().stack.clone()
    }

    /// Stack including every queued transition
    pub fn active_stack(&self) -> Vec<K> {
        self.cell.state.lock().active_stack().to_vec()
    }

    pub fn top(&self) -> Option<K> {
        self.cell.state.lock().stack.last().cloned()
    }

    pub fn has_root(&self) -> bool {
        !self.cell.state.lock().stack.is_empty()
    }

    pub fn ordering_indices(&self) -> Vec<u64> {
        self.cell.state.lock().ordering_indices.clone()
    }

    pub fn latest_ordering_token(&self) -> Option<u64> {
        self.cell.state.lock().ordering_indices.last().copied()
    }

    pub fn has_pending_transition(&self) -> bool {
        !self.cell.state.lock().queue.is_empty()
    }

    pub fn pending_transition_count(&self) -> usize {
        self.cell.state.lock().queue.len()
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// Hand the queue head to the collaborator if nothing blocks it
    fn begin_if_possible(&self) -> Result<()> {
        let (id, change, collaborator, removed, subscribers) = {
            let mut guard = self.cell.state.lock();
            let state = &mut *guard;
            if !state.foreground {
                return Ok(());
            }
            let Some(collaborator) = state.collaborator.clone() else {
                return Ok(());
            };
            let Some((id, change)) = state.queue.begin_head(&state.stack) else {
                return Ok(());
            };

            // Children whose key leaves the stack are destroyed before the render call
            let (kept, removed): (Vec<_>, Vec<_>) =
                state.children.drain(..).partition(|child| match child.owner_key() {
                    Some(key) => change.new_stack().contains(key),
                    None => true,
                });
            state.children = kept;

            (id, change, collaborator, removed, state.live_subscribers())
        };

        tracing::debug!(
            "Dispatching transition {} ({:?}): {} -> {} entries",
            id,
            change.direction(),
            change.previous_stack().len(),
            change.new_stack().len()
        );

        // The head is already in flight, so teardown errors are reported after hand-off
        let mut teardown = Ok(());
        for child in removed {
            if let Err(err) = child.destroy() {
                tracing::error!("Failed to destroy child engine {:?}: {}", child.owner_key(), err);
                teardown = Err(err);
            }
        }
        for subscriber in &subscribers {
            subscriber.on_pre_change(&change);
        }

        let completion = Completion::new(Arc::downgrade(&self.cell), id);
        if let Err(err) = collaborator.handle(change, completion, self) {
            let failed_here = {
                let mut state = self.cell.state.lock();
                if state.queue.is_in_flight(id) {
                    state.queue.requeue_in_flight();
                    if state
                        .collaborator
                        .as_ref()
                        .is_some_and(|current| Arc::ptr_eq(current, &collaborator))
                    {
                        state.collaborator = None;
                    }
                    true
                } else {
                    false
                }
            };
            if failed_here {
                tracing::error!("Render collaborator failed on transition {}: {}", id, err);
            }
            return Err(NavigationError::from_collaborator(err));
        }
        teardown
    }

    /// Commit the in-flight transition `id` and move on to the next one
    pub(crate) fn finish_transition(&self, id: TransitionId) -> Result<()> {
        let (direction, initial_bind) = {
            let state = self.cell.state.lock();
            match state.queue.head() {
                Some(head) if state.queue.is_in_flight(id) => (head.direction(), head.is_initial_bind()),
                _ => {
                    tracing::warn!("Ignoring completion for transition {} which is not in flight", id);
                    return Ok(());
                }
            }
        };

        // Minted before locking again; the root may be this very engine
        let token = match (direction, initial_bind) {
            (Direction::Forward, false) => self.next_ordering_token(),
            _ => None,
        };

        let (change, subscribers) = {
            let mut state = self.cell.state.lock();
            let Some(finished) = state.queue.complete_head(id) else {
                return Ok(());
            };

            let initial_bind = finished.is_initial_bind();
            let change = finished.into_change();
            state.stack = change.new_stack().to_vec();

            if !initial_bind {
                match change.direction() {
                    Direction::Forward => state.ordering_indices.extend(token),
                    Direction::Backward => {
                        state.ordering_indices.pop();
                    }
                    Direction::Replace => {}
                }
            }

            (change, state.live_subscribers())
        };

        tracing::debug!("Completed transition {} ({:?})", id, change.direction());
        for subscriber in &subscribers {
            subscriber.on_post_change(&change);
        }

        self.begin_if_possible()
    }

    fn next_ordering_token(&self) -> Option<u64> {
        let root = self.root();
        match root.cell.indexer.as_ref() {
            Some(indexer) => Some(indexer.next_token()),
            None => {
                tracing::warn!("Engine is detached from its tree root, no ordering token recorded");
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Serialize this engine and its subtree
    ///
    /// The tree-wide indexer is written by the root only.
    pub fn save_state(&self, codec: &dyn KeyCodec<K>) -> Result<SavedEngineState> {
        let (stack, ordering_indices, children) = {
            let state = self.cell.state.lock();
            (state.stack.clone(), state.ordering_indices.clone(), state.children.clone())
        };

        let owner_key = self.cell.owner_key.as_ref().map(|key| codec.encode(key)).transpose()?;
        let stack = stack
            .iter()
            .map(|key| codec.encode(key))
            .collect::<Result<Vec<_>>>()?;
        let children = children
            .iter()
            .map(|child| child.save_state(codec))
            .collect::<Result<Vec<_>>>()?;
        let indexer_next = match self.cell.indexer.as_ref() {
            Some(indexer) if self.is_root() => Some(indexer.peek_next()),
            _ => None,
        };

        Ok(SavedEngineState {
            owner_key,
            scope_tag: self.cell.scope_tag.clone(),
            stack,
            ordering_indices,
            children,
            indexer_next,
        })
    }

    /// Rebuild stack, ordering indices and child engines from `saved`
    ///
    /// Nothing is enqueued. The next [`Self::set_render_collaborator`]
    /// issues the initial bind.
    pub fn restore_state(&self, saved: &SavedEngineState, codec: &dyn KeyCodec<K>) -> Result<()> {
        let stack = saved
            .stack
            .iter()
            .map(|persisted| codec.decode(persisted))
            .collect::<Result<Vec<_>>>()?;
        let ordering_indices = saved.ordering_indices.clone();

        let foreground = self.is_foreground();
        let mut children = Vec::with_capacity(saved.children.len());
        for child_state in &saved.children {
            let Some(persisted_key) = child_state.owner_key.as_ref() else {
                return Err(NavigationError::Codec(format!(
                    "child engine {:?} was saved without an owner key",
                    child_state.scope_tag
                )));
            };
            let owner_key = codec.decode(persisted_key)?;
            let child = Self::new_child(self, owner_key, child_state.scope_tag.clone(), foreground);
            child.restore_state(child_state, codec)?;
            children.push(child);
        }

        if let (Some(indexer), Some(next)) = (self.cell.indexer.as_ref(), saved.indexer_next) {
            indexer.restore(next);
        }

        let mut state = self.cell.state.lock();
        state.stack = stack;
        state.ordering_indices = ordering_indices;
        state.children = children;
        tracing::debug!(
            "Restored engine {:?} with {} entries and {} children",
            self.cell.scope_tag,
            state.stack.len(),
            state.children.len()
        );
        Ok(())
    }
}

impl<K: Key> fmt::Debug for NavigationEngine<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.cell.state.lock();
        f.debug_struct("NavigationEngine")
            .field("owner_key", &self.cell.owner_key)
            .field("scope_tag", &self.cell.scope_tag)
            .field("stack", &state.stack)
            .field("queued", &state.queue.len())
            .field("children", &state.children.len())
            .field("foreground", &state.foreground)
            .finish()
    }
}
