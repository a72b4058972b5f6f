use nav_core::{NavigationError, Result, SavedEngineState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Saved state of every root engine of a host, by tag
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedHostState {
    #[serde(default)]
    pub engines: BTreeMap<String, SavedEngineState>,
}

impl SavedHostState {
    pub fn engine(&self, tag: &str) -> Option<&SavedEngineState> {
        self.engines.get(tag)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(NavigationError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_tag() {
        let mut saved = SavedHostState::default();
        saved.engines.insert(
            "main".to_string(),
            SavedEngineState {
                scope_tag: "main".to_string(),
                ..Default::default()
            },
        );

        let restored = SavedHostState::from_json(&saved.to_json().unwrap()).unwrap();
        assert_eq!(restored, saved);
        assert!(restored.engine("main").is_some());
        assert!(restored.engine("other").is_none());
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = SavedHostState::from_json("{\"engines\": 3}").unwrap_err();
        assert!(matches!(err, NavigationError::Serialization(_)));
    }
}
