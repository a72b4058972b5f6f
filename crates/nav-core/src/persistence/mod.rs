//! Saved engine state and the key codec used to produce it

use crate::error::{NavigationError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Persisted representation of a single key
pub type PersistedKey = serde_json::Value;

/// Converts keys to and from their persisted form
pub trait KeyCodec<K>: Send + Sync {
    fn encode(&self, key: &K) -> Result<PersistedKey>;

    fn decode(&self, persisted: &PersistedKey) -> Result<K>;
}

/// Default codec for keys that are directly serializable
#[derive(Debug, Clone, Copy, Default)]
pub struct SerdeKeyCodec;

impl<K> KeyCodec<K> for SerdeKeyCodec
where
    K: Serialize + DeserializeOwned,
{
    fn encode(&self, key: &K) -> Result<PersistedKey> {
        Ok(serde_json::to_value(key)?)
    }

    fn decode(&self, persisted: &PersistedKey) -> Result<K> {
        Ok(K::deserialize(persisted)?)
    }
}

/// Saved state of one engine and, recursively, its children
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedEngineState {
    /// Key the engine is scoped to; absent on roots
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_key: Option<PersistedKey>,

    #[serde(default)]
    pub scope_tag: String,

    /// Committed stack, bottom first
    #[serde(default)]
    pub stack: Vec<PersistedKey>,

    #[serde(default)]
    pub ordering_indices: Vec<u64>,

    #[serde(default)]
    pub children: Vec<SavedEngineState>,

    /// Next value of the tree-wide indexer, written by the root only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexer_next: Option<u64>,
}

impl SavedEngineState {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(NavigationError::from)
    }

    /// Number of engines in this subtree, including this one
    pub fn engine_count(&self) -> usize {
        1 + self.children.iter().map(SavedEngineState::engine_count).sum::<usize>()
    }
}
