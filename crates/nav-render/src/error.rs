use thiserror::Error;

/// Errors raised by views and the view renderer
#[derive(Error, Debug)]
pub enum RenderError {
    /// Saved view state could not be applied
    #[error("Invalid saved state for view {view}: {reason}")]
    InvalidState { view: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
