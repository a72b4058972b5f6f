//! Demo configuration

use anyhow::{Context, Result};
use nav_host::HostSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming an optional JSON settings file
pub const CONFIG_ENV: &str = "NAVDEMO_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoSettings {
    pub host: HostSettings,

    /// Play view change animations; when off every change completes at once
    pub animate: bool,

    /// Multiplier applied to animation lengths
    pub animation_scale: f64,

    /// Print the frames recorded by change handlers after each command
    pub show_frames: bool,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            host: HostSettings {
                default_tag: "main".to_string(),
                start_in_foreground: true,
            },
            animate: true,
            animation_scale: 1.0,
            show_frames: true,
        }
    }
}

impl DemoSettings {
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("Invalid settings in {}", path.display()))
    }

    /// Settings from the file named by [`CONFIG_ENV`], else defaults
    pub fn load() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }
}
