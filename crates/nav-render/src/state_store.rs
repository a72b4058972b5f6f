//! Saved view state, kept per key while a view is off screen

use nav_core::Key;
use serde_json::Value;

/// Per-key view state
#[derive(Debug, Clone)]
pub struct ViewStateStore<K> {
    states: Vec<(K, Value)>,
}

impl<K> Default for ViewStateStore<K> {
    fn default() -> Self {
        Self { states: Vec::new() }
    }
}

impl<K: Key> ViewStateStore<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `state` for `key`, replacing anything stored before
    pub fn save(&mut self, key: K, state: Value) {
        match self.states.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = state,
            None => self.states.push((key, state)),
        }
    }

    pub fn get(&self, key: &K) -> Option<&Value> {
        self.states
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, state)| state)
    }

    /// Forget state for keys that are no longer on `stack`
    pub fn retain_stack(&mut self, stack: &[K]) {
        self.states.retain(|(key, _)| stack.contains(key));
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_replaces_existing_state() {
        let mut store = ViewStateStore::new();
        store.save("home", Value::from(1));
        store.save("home", Value::from(2));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&"home"), Some(&Value::from(2)));
        assert_eq!(store.get(&"detail"), None);
    }

    #[test]
    fn test_retain_stack_drops_removed_keys() {
        let mut store = ViewStateStore::new();
        store.save("home", Value::from(1));
        store.save("detail", Value::from(2));
        store.retain_stack(&["home"]);
        assert_eq!(store.len(), 1);
        assert!(store.get(&"detail").is_none());
    }
}
