//! Hex engine library.
//!
//! A small entity-component engine with an event pipeline: entities and
//! their components, rooms and viewports, a synchronous frame loop and the
//! named-event bus that modules attach behaviour to. Everything goes through
//! [`Engine`].

pub mod components;
pub mod engine;
pub mod error;
pub mod events;
pub mod resources;
pub mod snapshot;
pub mod systems;

pub use components::geometry::{Rect, Size, Vec2};
pub use engine::{Engine, EngineBuilder, LoopState};
pub use error::{EngineError, EngineResult};
pub use resources::entitystore::Entity;
pub use resources::filter::{EntityFilter, FilterRule};
pub use resources::identifiers::{EntityId, RoomId, ViewportId};
pub use resources::viewports::{Viewport, ViewportProperties};
pub use snapshot::EngineSnapshot;
