//! Entity records.
//!
//! An entity is identity only: its id plus the id of the engine that owns it.
//! All data lives in the [`ComponentStore`]; room membership lives in the
//! [`RoomRegistry`](crate::resources::rooms::RoomRegistry). Like the other
//! stores, the record map is copy-on-write so snapshots stay valid.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::resources::componentstore::ComponentStore;
use crate::resources::filter::EntityFilter;
use crate::resources::identifiers::{EngineId, EntityId};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entity {
    id: EntityId,
    owner: EngineId,
}

impl Entity {
    pub(crate) fn new(id: EntityId, owner: EngineId) -> Self {
        Self { id, owner }
    }

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    /// The engine this entity was created by.
    pub fn owner(&self) -> EngineId {
        self.owner
    }
}

#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    entities: Rc<FxHashMap<EntityId, Entity>>,
    generation: u64,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity: Entity) {
        Rc::make_mut(&mut self.entities).insert(entity.id.clone(), entity);
        self.generation += 1;
    }

    pub fn remove(&mut self, id: &EntityId) -> Option<Entity> {
        if !self.entities.contains_key(id) {
            return None;
        }
        self.generation += 1;
        Rc::make_mut(&mut self.entities).remove(id)
    }

    pub fn get(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.entities.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Run `filter` over `candidates` and resolve the survivors to entity
    /// records, keeping candidate order. Ids without a record are skipped.
    pub fn query(
        &self,
        candidates: &[EntityId],
        filter: &EntityFilter,
        components: &ComponentStore,
    ) -> Vec<Entity> {
        filter
            .apply(candidates, components)
            .iter()
            .filter_map(|id| self.entities.get(id).cloned())
            .collect()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn same_state(&self, other: &EntityStore) -> bool {
        Rc::ptr_eq(&self.entities, &other.entities)
    }
}
