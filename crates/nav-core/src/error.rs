//! Error types for navigation operations

use thiserror::Error;

/// Errors that can occur while navigating
#[derive(Error, Debug)]
pub enum NavigationError {
    /// A child engine was requested for a key that is not on the active stack
    #[error("{key} must be in the backstack")]
    KeyNotInStack { key: String },

    /// A collaborator needed a capability the key does not provide
    #[error("{key} is not a {capability}")]
    UnsupportedKey {
        key: String,
        capability: &'static str,
    },

    #[error("Key codec error: {0}")]
    Codec(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The render collaborator refused or failed to start a state change
    #[error("Render collaborator failed: {0}")]
    Render(#[from] anyhow::Error),
}

impl NavigationError {
    pub(crate) fn key_not_in_stack(key: &impl std::fmt::Debug) -> Self {
        NavigationError::KeyNotInStack {
            key: format!("{:?}", key),
        }
    }

    /// `key` lacks the capability a collaborator depends on
    pub fn unsupported_key(key: &impl std::fmt::Debug, capability: &'static str) -> Self {
        NavigationError::UnsupportedKey {
            key: format!("{:?}", key),
            capability,
        }
    }

    /// Convert a collaborator error, unwrapping navigation errors raised further down the chain
    pub(crate) fn from_collaborator(error: anyhow::Error) -> Self {
        match error.downcast::<NavigationError>() {
            Ok(inner) => inner,
            Err(other) => NavigationError::Render(other),
        }
    }
}

/// Result alias used across the navigation crates
pub type Result<T> = std::result::Result<T, NavigationError>;
