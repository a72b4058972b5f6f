//! Host adapter for navigation engines
//!
//! Keeps root engines alive across host window recreation, forwards
//! lifecycle signals to them and bundles their saved state.

mod host;
mod saved;
mod settings;

pub use host::EngineHost;
pub use saved::SavedHostState;
pub use settings::HostSettings;
