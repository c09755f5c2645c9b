//! Rooms and the current-room pointer.
//!
//! A room partitions the world: it lists the entities and viewports that
//! belong to it, in insertion order. At most one room is current, and only the
//! current room's entities are visible to queries.
//!
//! Membership lists are append-only and not deduplicated; adding the same id
//! twice lists it twice (and queries return it twice).

use std::rc::Rc;

use log::{debug, warn};
use rustc_hash::FxHashMap;

use crate::components::geometry::Size;
use crate::error::{EngineError, EngineResult};
use crate::resources::identifiers::{EntityId, RoomId, ViewportId};

#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    id: RoomId,
    size: Size,
    entities: Vec<EntityId>,
    viewports: Vec<ViewportId>,
}

impl Room {
    fn new(id: RoomId, size: Size) -> Self {
        Self {
            id,
            size,
            entities: Vec::new(),
            viewports: Vec::new(),
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Member entities in insertion order.
    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    /// Member viewports in insertion order.
    pub fn viewports(&self) -> &[ViewportId] {
        &self.viewports
    }

    pub fn contains_entity(&self, id: &EntityId) -> bool {
        self.entities.contains(id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RoomRegistry {
    rooms: Rc<FxHashMap<RoomId, Room>>,
    current: Option<RoomId>,
    generation: u64,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty room. An existing room with the same id is replaced.
    pub fn create(&mut self, id: RoomId, size: Size) {
        if self.rooms.contains_key(&id) {
            warn!("room '{id}' already exists, replacing it with an empty room");
        }
        debug!("created room '{id}' ({}x{})", size.width, size.height);
        Rc::make_mut(&mut self.rooms).insert(id.clone(), Room::new(id, size));
        self.generation += 1;
    }

    pub fn set_current(&mut self, id: &RoomId) -> EngineResult<()> {
        if !self.rooms.contains_key(id) {
            return Err(EngineError::RoomNotFound(id.clone()));
        }
        debug!("current room is now '{id}'");
        self.current = Some(id.clone());
        self.generation += 1;
        Ok(())
    }

    pub fn current_id(&self) -> Option<&RoomId> {
        self.current.as_ref()
    }

    pub fn current(&self) -> Option<&Room> {
        self.current.as_ref().and_then(|id| self.rooms.get(id))
    }

    pub fn get(&self, id: &RoomId) -> Option<&Room> {
        self.rooms.get(id)
    }

    pub fn contains(&self, id: &RoomId) -> bool {
        self.rooms.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    pub fn add_entity(&mut self, room_id: &RoomId, entity_id: EntityId) -> EngineResult<()> {
        self.room_mut(room_id)?.entities.push(entity_id);
        Ok(())
    }

    pub fn add_viewport(&mut self, room_id: &RoomId, viewport_id: ViewportId) -> EngineResult<()> {
        self.room_mut(room_id)?.viewports.push(viewport_id);
        Ok(())
    }

    /// Drop every occurrence of `entity_id` from every room's member list.
    pub fn remove_entity_everywhere(&mut self, entity_id: &EntityId) -> usize {
        let holding = self
            .rooms
            .values()
            .any(|room| room.contains_entity(entity_id));
        if !holding {
            return 0;
        }

        let mut removed = 0;
        for room in Rc::make_mut(&mut self.rooms).values_mut() {
            let before = room.entities.len();
            room.entities.retain(|id| id != entity_id);
            removed += before - room.entities.len();
        }
        self.generation += 1;
        removed
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn same_state(&self, other: &RoomRegistry) -> bool {
        Rc::ptr_eq(&self.rooms, &other.rooms) && self.current == other.current
    }

    fn room_mut(&mut self, room_id: &RoomId) -> EngineResult<&mut Room> {
        if !self.rooms.contains_key(room_id) {
            return Err(EngineError::RoomNotFound(room_id.clone()));
        }
        self.generation += 1;
        Rc::make_mut(&mut self.rooms)
            .get_mut(room_id)
            .ok_or_else(|| EngineError::RoomNotFound(room_id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(ids: &[&str]) -> RoomRegistry {
        let mut rooms = RoomRegistry::new();
        for id in ids {
            rooms.create(RoomId::from(*id), Size::new(320.0, 180.0));
        }
        rooms
    }

    #[test]
    fn no_current_room_by_default() {
        let rooms = registry_with(&["a"]);
        assert!(rooms.current().is_none());
        assert!(rooms.current_id().is_none());
    }

    #[test]
    fn set_current_requires_known_room() {
        let mut rooms = registry_with(&["a"]);
        assert_eq!(
            rooms.set_current(&RoomId::from("b")),
            Err(EngineError::RoomNotFound(RoomId::from("b")))
        );
        rooms.set_current(&RoomId::from("a")).unwrap();
        assert_eq!(rooms.current().map(|r| r.id().as_str()), Some("a"));
    }

    #[test]
    fn membership_is_append_only_without_dedup() {
        let mut rooms = registry_with(&["a"]);
        let room = RoomId::from("a");
        rooms.add_entity(&room, EntityId::from("e1")).unwrap();
        rooms.add_entity(&room, EntityId::from("e2")).unwrap();
        rooms.add_entity(&room, EntityId::from("e1")).unwrap();
        rooms.add_viewport(&room, ViewportId::from("v1")).unwrap();
        rooms.add_viewport(&room, ViewportId::from("v1")).unwrap();

        let room = rooms.get(&room).unwrap();
        let members: Vec<&str> = room.entities().iter().map(|e| e.as_str()).collect();
        assert_eq!(members, vec!["e1", "e2", "e1"]);
        assert_eq!(room.viewports().len(), 2);
    }

    #[test]
    fn adding_to_unknown_room_fails() {
        let mut rooms = registry_with(&[]);
        let missing = RoomId::from("nowhere");
        assert!(matches!(
            rooms.add_entity(&missing, EntityId::from("e")),
            Err(EngineError::RoomNotFound(_))
        ));
        assert!(matches!(
            rooms.add_viewport(&missing, ViewportId::from("v")),
            Err(EngineError::RoomNotFound(_))
        ));
    }

    #[test]
    fn remove_entity_everywhere_drops_all_occurrences() {
        let mut rooms = registry_with(&["a", "b"]);
        let e = EntityId::from("e");
        rooms.add_entity(&RoomId::from("a"), e.clone()).unwrap();
        rooms.add_entity(&RoomId::from("a"), e.clone()).unwrap();
        rooms.add_entity(&RoomId::from("b"), e.clone()).unwrap();
        rooms.add_entity(&RoomId::from("b"), EntityId::from("other")).unwrap();

        assert_eq!(rooms.remove_entity_everywhere(&e), 3);
        assert!(rooms.iter().all(|room| !room.contains_entity(&e)));
        assert_eq!(rooms.get(&RoomId::from("b")).unwrap().entities().len(), 1);
        assert_eq!(rooms.remove_entity_everywhere(&e), 0);
    }

    #[test]
    fn recreating_a_room_clears_it() {
        let mut rooms = registry_with(&["a"]);
        rooms
            .add_entity(&RoomId::from("a"), EntityId::from("e"))
            .unwrap();
        rooms.create(RoomId::from("a"), Size::new(10.0, 10.0));
        let room = rooms.get(&RoomId::from("a")).unwrap();
        assert!(room.entities().is_empty());
        assert_eq!(room.size(), Size::new(10.0, 10.0));
    }
}
