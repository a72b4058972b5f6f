use serde::{Deserialize, Serialize};

/// Host configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostSettings {
    /// Tag of the root engine used by `attach_default_engine` and back handling
    pub default_tag: String,

    /// Whether newly attached engines dispatch right away
    pub start_in_foreground: bool,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            default_tag: String::new(),
            start_in_foreground: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: HostSettings = serde_json::from_str(r#"{"default_tag":"main"}"#).unwrap();
        assert_eq!(settings.default_tag, "main");
        assert!(settings.start_in_foreground);
    }
}
