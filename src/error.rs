//! Engine error type.
//!
//! Every fallible engine operation returns [`EngineResult`]. Errors are raised
//! synchronously by the operation that detected them and carry the offending
//! id or name in their message. Event handlers return the same type, so a
//! failing handler propagates out of `emit_event`, `update`/`draw` and `step`
//! unchanged.

use std::fmt;

use crate::resources::identifiers::{EntityId, RoomId, ViewportId};

/// Errors produced by the engine and by event handlers.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The entity id is not registered with the engine.
    EntityNotFound(EntityId),
    /// The room id is not registered with the engine.
    RoomNotFound(RoomId),
    /// An operation defaulted to the current room but none is set.
    NoCurrentRoom,
    /// The viewport id is not registered with the engine.
    ViewportNotFound(ViewportId),
    /// No sprite with that name has been added to the sprite store.
    SpriteNotFound(String),
    /// A malformed filter, components value or typed component payload.
    InvalidArgument(String),
    /// A module name collides with an engine property or another module.
    NameCollision(String),
    /// Failure raised from inside an event handler.
    Handler(String),
    /// Configuration file could not be read, parsed or written.
    Config(String),
}

/// Convenience alias used across the crate.
pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// Build a handler failure from any message.
    pub fn handler(message: impl Into<String>) -> Self {
        EngineError::Handler(message.into())
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        EngineError::InvalidArgument(message.into())
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::EntityNotFound(id) => write!(f, "no entity with id \"{id}\" found"),
            EngineError::RoomNotFound(id) => write!(f, "can't find room with id \"{id}\""),
            EngineError::NoCurrentRoom => write!(f, "no room is set as current"),
            EngineError::ViewportNotFound(id) => {
                write!(f, "can't find viewport with id \"{id}\"")
            }
            EngineError::SpriteNotFound(name) => write!(f, "no sprite named \"{name}\""),
            EngineError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            EngineError::NameCollision(name) => write!(
                f,
                "cannot register a module under name \"{name}\" because that name is already taken on the engine"
            ),
            EngineError::Handler(msg) => write!(f, "event handler failed: {msg}"),
            EngineError::Config(msg) => write!(f, "config error: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}
