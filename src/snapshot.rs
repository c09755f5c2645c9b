//! Read-only captures of engine state.
//!
//! Every store keeps its maps behind `Rc` and copies on write, so taking a
//! snapshot only bumps reference counts. The snapshot keeps observing the
//! state at capture time however the engine moves on.

use serde_json::Value;

use crate::components::value::Components;
use crate::resources::componentstore::ComponentStore;
use crate::resources::entitystore::{Entity, EntityStore};
use crate::resources::identifiers::{EntityId, RoomId, ViewportId};
use crate::resources::rooms::{Room, RoomRegistry};
use crate::resources::viewports::{Viewport, ViewportRegistry};

#[derive(Debug, Clone)]
pub struct EngineSnapshot {
    components: ComponentStore,
    entities: EntityStore,
    rooms: RoomRegistry,
    viewports: ViewportRegistry,
}

/// Generation counters of each store at capture time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generations {
    pub components: u64,
    pub entities: u64,
    pub rooms: u64,
    pub viewports: u64,
}

impl EngineSnapshot {
    pub(crate) fn new(
        components: ComponentStore,
        entities: EntityStore,
        rooms: RoomRegistry,
        viewports: ViewportRegistry,
    ) -> Self {
        Self {
            components,
            entities,
            rooms,
            viewports,
        }
    }

    pub fn component_for_entity(&self, name: &str, entity_id: &EntityId) -> Option<&Value> {
        self.components.get(name, entity_id)
    }

    pub fn components_for_entity(&self, entity_id: &EntityId) -> Components {
        self.components.components_for(entity_id)
    }

    pub fn component_names(&self) -> Vec<String> {
        self.components.names()
    }

    pub fn entity(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn room(&self, id: &RoomId) -> Option<&Room> {
        self.rooms.get(id)
    }

    pub fn current_room(&self) -> Option<&Room> {
        self.rooms.current()
    }

    pub fn viewport(&self, id: &ViewportId) -> Option<&Viewport> {
        self.viewports.get(id)
    }

    pub fn generations(&self) -> Generations {
        Generations {
            components: self.components.generation(),
            entities: self.entities.generation(),
            rooms: self.rooms.generation(),
            viewports: self.viewports.generation(),
        }
    }

    /// Whether any store changed between the two captures. Compares map
    /// identity, not contents.
    pub fn differs_from(&self, other: &EngineSnapshot) -> bool {
        !(self.components.same_state(&other.components)
            && self.entities.same_state(&other.entities)
            && self.rooms.same_state(&other.rooms)
            && self.viewports.same_state(&other.viewports))
    }
}
