//! Core functionality for the navigation engine
//! 
//! This crate provides the backstack state machine, the single-flight
//! transition queue, nested engine trees and persistence of engine state.
//! Rendering and host integration live in other crates and talk to the
//! engine through [`RenderCollaborator`] and the lifecycle hooks on
//! [`NavigationEngine`].

pub mod error;
pub mod navigation;
pub mod persistence;

// Re-export commonly used types
pub use error::{NavigationError, Result};
pub use navigation::{
    Completion, Direction, Key, NavigationEngine, NavigationSubscriber, OrderingIndexer,
    PendingTransition, RenderCollaborator, StateChange, TransitionId, TransitionQueue,
    TransitionStatus,
};
pub use persistence::{KeyCodec, PersistedKey, SavedEngineState, SerdeKeyCodec};
