//! The engine facade.
//!
//! [`Engine`] owns every store (components, entities, rooms, viewports), the
//! event bus, the module registry, the per-engine input state and the frame
//! clock. All mutation goes through its methods; handlers receive `&mut
//! Engine` and may mutate freely, and their changes are visible to the next
//! handler of the same dispatch.
//!
//! # Frame loop
//!
//! ```text
//! start() ──► Running ──► step(): update() = emit update, emit endUpdate
//!                                 draw()   = emit draw
//!                          └─ still running? schedule another frame
//! stop()  ──► Stopped (after the in-flight step)
//! ```
//!
//! The host drives frames with [`Engine::run`] and a
//! [`FrameScheduler`](crate::systems::scheduler::FrameScheduler), or calls
//! [`Engine::step`] itself.

use std::fmt;
use std::rc::Rc;

use log::{debug, error, info, trace, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::components::geometry::Size;
use crate::components::value::Components;
use crate::error::{EngineError, EngineResult};
use crate::events::bus::{EventBus, EventHandler};
use crate::events::phase;
use crate::resources::componentstore::ComponentStore;
use crate::resources::entitystore::{Entity, EntityStore};
use crate::resources::filter::EntityFilter;
use crate::resources::gameconfig::EngineConfig;
use crate::resources::identifiers::{EngineId, EntityId, IdentifierSource, RoomId, ViewportId};
use crate::resources::input::InputState;
use crate::resources::modules::ModuleRegistry;
use crate::resources::rooms::{Room, RoomRegistry};
use crate::resources::viewports::{Viewport, ViewportProperties, ViewportRegistry};
use crate::resources::worldtime::WorldTime;
use crate::snapshot::EngineSnapshot;
use crate::systems::scheduler::FrameScheduler;

/// Every field and public operation of [`Engine`]. Module names may not
/// shadow any of them, in either `snake_case` or `camelCase` spelling.
pub const ENGINE_MEMBERS: &[&str] = &[
    // state
    "id",
    "ids",
    "config",
    "components",
    "entities",
    "rooms",
    "viewports",
    "events",
    "modules",
    "input",
    "time",
    "state",
    "frame_pending",
    "in_step",
    // construction
    "new",
    "builder",
    // frame loop
    "is_running",
    "has_pending_frame",
    "start",
    "stop",
    "step",
    "update",
    "draw",
    "run",
    "input_mut",
    // rooms and viewports
    "create_room",
    "set_current_room",
    "current_room",
    "current_room_id",
    "get_room",
    "add_entity_to_room",
    "add_viewport_to_room",
    "create_viewport",
    "get_viewport",
    "update_viewport",
    "viewports_in_current_room",
    // entities
    "create_entity",
    "remove_entity",
    "get_entity",
    "get_entities",
    "get_entities_from_json",
    "entity_count",
    "owns",
    // components
    "set_component_for_entity",
    "set_components_for_entity",
    "remove_component_from_entity",
    "remove_components_from_entity",
    "get_component_for_entity",
    "get_components_for_entity",
    "has_component",
    "component_names",
    "set_component_as",
    "get_component_as",
    // events
    "add_event_handler",
    "add_event_handler_for_entities",
    "add_event_handler_for_entity_group",
    "emit_event",
    "handler_count",
    "has_handlers",
    // modules
    "module",
    "has_module",
    "module_names",
    "snapshot",
];

/// Frame loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    #[default]
    Stopped,
    Running,
}

pub struct Engine {
    id: EngineId,
    ids: IdentifierSource,
    config: EngineConfig,
    components: ComponentStore,
    entities: EntityStore,
    rooms: RoomRegistry,
    viewports: ViewportRegistry,
    events: EventBus,
    modules: ModuleRegistry,
    input: InputState,
    time: WorldTime,
    state: LoopState,
    frame_pending: bool,
    in_step: bool,
}

type ModuleInstaller = Box<dyn FnOnce(&mut Engine) -> EngineResult<()>>;

/// Builds an [`Engine`] and its modules.
///
/// Module constructors run in registration order, each receiving the engine
/// built so far. A name that collides with the engine's own properties or an
/// earlier module fails the whole build before that constructor runs.
#[derive(Default)]
pub struct EngineBuilder {
    ids: Option<IdentifierSource>,
    config: Option<EngineConfig>,
    modules: Vec<(String, ModuleInstaller)>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `ids` to generate entity, room and viewport ids.
    pub fn with_identifiers(mut self, ids: IdentifierSource) -> Self {
        self.ids = Some(ids);
        self
    }

    /// Apply `config`. Its `id_seed`, if any, seeds the identifier source
    /// unless one was given explicitly.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_module<T, F>(mut self, name: impl Into<String>, constructor: F) -> Self
    where
        T: 'static,
        F: FnOnce(&mut Engine) -> EngineResult<T> + 'static,
    {
        let name = name.into();
        let key = name.clone();
        let install: ModuleInstaller = Box::new(move |engine: &mut Engine| {
            let module = constructor(engine)?;
            engine.modules.insert(&key, module)?;
            Ok(())
        });
        self.modules.push((name, install));
        self
    }

    pub fn build(self) -> EngineResult<Engine> {
        let config = self.config.unwrap_or_default();
        let ids = match (self.ids, config.id_seed) {
            (Some(ids), _) => ids,
            (None, Some(seed)) => IdentifierSource::with_seed(seed),
            (None, None) => IdentifierSource::new(),
        };
        let mut engine = Engine::with_parts(ids, config);

        for (name, install) in self.modules {
            engine.modules.check_name(&name)?;
            install(&mut engine)?;
            debug!("engine {}: installed module '{name}'", engine.id.raw());
        }
        Ok(engine)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// An engine without modules, generating ids from process entropy.
    pub fn new() -> Self {
        Self::with_parts(IdentifierSource::new(), EngineConfig::default())
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    fn with_parts(ids: IdentifierSource, config: EngineConfig) -> Self {
        let engine = Self {
            id: EngineId::next(),
            ids,
            config,
            components: ComponentStore::new(),
            entities: EntityStore::new(),
            rooms: RoomRegistry::new(),
            viewports: ViewportRegistry::new(),
            events: EventBus::new(),
            modules: ModuleRegistry::new(),
            input: InputState::new(),
            time: WorldTime::default(),
            state: LoopState::Stopped,
            frame_pending: false,
            in_step: false,
        };
        debug!("engine {} created", engine.id.raw());
        engine
    }

    pub fn id(&self) -> EngineId {
        self.id
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ---------------------------------------------------------------------
    // Frame loop
    // ---------------------------------------------------------------------

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Whether another `step` has been scheduled.
    pub fn has_pending_frame(&self) -> bool {
        self.frame_pending
    }

    /// Start the loop and schedule the first frame. No-op when running.
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        info!("engine {}: starting frame loop", self.id.raw());
        self.state = LoopState::Running;
        self.frame_pending = true;
    }

    /// Stop the loop. A step in progress still finishes; no further frame is
    /// scheduled after it.
    pub fn stop(&mut self) {
        if self.is_running() {
            info!("engine {}: stopping frame loop", self.id.raw());
        }
        self.state = LoopState::Stopped;
        if !self.in_step {
            self.frame_pending = false;
        }
    }

    /// Run one frame: `update()` then `draw()`. Reschedules only while the
    /// loop is still running afterwards.
    ///
    /// A handler failure propagates out and terminates the loop.
    pub fn step(&mut self) -> EngineResult<()> {
        self.in_step = true;
        let result = self.update().and_then(|()| self.draw());
        self.in_step = false;

        match result {
            Ok(()) => {
                self.frame_pending = self.is_running();
                Ok(())
            }
            Err(err) => {
                error!("engine {}: frame failed, loop terminated: {err}", self.id.raw());
                self.state = LoopState::Stopped;
                self.frame_pending = false;
                Err(err)
            }
        }
    }

    /// Emit `update` then `endUpdate`. Both are always emitted; when either
    /// fails the first failure is returned.
    pub fn update(&mut self) -> EngineResult<()> {
        let updated = self.emit_event(phase::UPDATE, &[]);
        let ended = self.emit_event(phase::END_UPDATE, &[]);
        match (updated, ended) {
            (Err(first), Err(second)) => {
                error!("'{}' also failed: {second}", phase::END_UPDATE);
                Err(first)
            }
            (Err(first), Ok(())) => Err(first),
            (Ok(()), ended) => ended,
        }
    }

    pub fn draw(&mut self) -> EngineResult<()> {
        self.emit_event(phase::DRAW, &[])
    }

    /// Drive the loop from `scheduler` while a frame is pending: advance the
    /// clock to each frame's timestamp and step. Returns the number of frames
    /// stepped. The loop must have been started.
    ///
    /// A scheduler that yields no frame stops the loop.
    pub fn run(&mut self, scheduler: &mut dyn FrameScheduler) -> EngineResult<u64> {
        let mut frames = 0;
        while self.frame_pending {
            let Some(timestamp) = scheduler.next_frame() else {
                debug!("engine {}: scheduler closed after {frames} frames", self.id.raw());
                self.stop();
                break;
            };
            self.time.advance_to(timestamp);
            self.step()?;
            frames += 1;
        }
        Ok(frames)
    }

    pub fn time(&self) -> &WorldTime {
        &self.time
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    // ---------------------------------------------------------------------
    // Rooms
    // ---------------------------------------------------------------------

    /// Create an empty room, generating an id when `id` is `None`.
    pub fn create_room(
        &mut self,
        id: Option<RoomId>,
        size: Size,
        set_as_current: bool,
    ) -> EngineResult<RoomId> {
        let id = match id {
            Some(id) => id,
            None => loop {
                let candidate = self.ids.room_id();
                if !self.rooms.contains(&candidate) {
                    break candidate;
                }
            },
        };
        self.rooms.create(id.clone(), size);
        if set_as_current {
            self.rooms.set_current(&id)?;
        }
        Ok(id)
    }

    pub fn set_current_room(&mut self, id: &RoomId) -> EngineResult<()> {
        self.rooms.set_current(id)
    }

    /// The current room, if one is set.
    pub fn current_room(&self) -> Option<&Room> {
        self.rooms.current()
    }

    pub fn current_room_id(&self) -> Option<&RoomId> {
        self.rooms.current_id()
    }

    pub fn get_room(&self, id: &RoomId) -> Option<&Room> {
        self.rooms.get(id)
    }

    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.iter()
    }

    pub fn add_entity_to_room(&mut self, entity_id: &EntityId, room_id: &RoomId) -> EngineResult<()> {
        self.rooms.add_entity(room_id, entity_id.clone())
    }

    pub fn add_viewport_to_room(
        &mut self,
        viewport_id: &ViewportId,
        room_id: &RoomId,
    ) -> EngineResult<()> {
        self.rooms.add_viewport(room_id, viewport_id.clone())
    }

    fn target_room(&self, room_id: Option<&RoomId>) -> EngineResult<RoomId> {
        let id = match room_id {
            Some(id) => id.clone(),
            None => self.rooms.current_id().cloned().ok_or(EngineError::NoCurrentRoom)?,
        };
        if !self.rooms.contains(&id) {
            return Err(EngineError::RoomNotFound(id));
        }
        Ok(id)
    }

    // ---------------------------------------------------------------------
    // Viewports
    // ---------------------------------------------------------------------

    /// Create a viewport from `properties` merged over the defaults and
    /// attach it to `room_id` (default: the current room).
    pub fn create_viewport(
        &mut self,
        properties: ViewportProperties,
        room_id: Option<&RoomId>,
    ) -> EngineResult<Viewport> {
        let room_id = self.target_room(room_id)?;

        let ids = &mut self.ids;
        let existing = &self.viewports;
        let viewport = properties.into_viewport(|| loop {
            let candidate = ids.viewport_id();
            if !existing.contains(&candidate) {
                break candidate;
            }
        });

        if self.viewports.contains(&viewport.id) {
            warn!("viewport '{}' already exists, replacing it", viewport.id);
        }
        self.viewports.insert(viewport.clone());
        self.rooms.add_viewport(&room_id, viewport.id.clone())?;
        debug!("created viewport '{}' in room '{room_id}'", viewport.id);
        Ok(viewport)
    }

    pub fn get_viewport(&self, id: &ViewportId) -> Option<&Viewport> {
        self.viewports.get(id)
    }

    pub fn update_viewport(
        &mut self,
        id: &ViewportId,
        change: impl FnOnce(&mut Viewport),
    ) -> EngineResult<()> {
        self.viewports.update(id, change)
    }

    /// Viewports of the current room in membership order.
    pub fn viewports_in_current_room(&self) -> Vec<Viewport> {
        let Some(room) = self.rooms.current() else {
            return Vec::new();
        };
        room.viewports()
            .iter()
            .filter_map(|id| self.viewports.get(id).cloned())
            .collect()
    }

    // ---------------------------------------------------------------------
    // Entities
    // ---------------------------------------------------------------------

    /// Register a new entity with `components` (a JSON object, or `null` for
    /// none) in `room_id` (default: the current room).
    ///
    /// The room and the components value are validated before anything is
    /// registered.
    pub fn create_entity(&mut self, components: Value, room_id: Option<&RoomId>) -> EngineResult<Entity> {
        let components = into_components(components)?;
        let room_id = self.target_room(room_id)?;

        let id = loop {
            let candidate = self.ids.entity_id();
            if !self.entities.contains(&candidate) {
                break candidate;
            }
        };
        let entity = Entity::new(id.clone(), self.id);
        self.entities.insert(entity.clone());
        for (name, value) in components {
            self.components.set(&name, value, &id);
        }
        self.rooms.add_entity(&room_id, id.clone())?;
        debug!("created entity '{id}' in room '{room_id}'");
        Ok(entity)
    }

    /// Remove an entity from every room, drop its components, then its
    /// record. Returns the removed record, or `None` if it did not exist.
    pub fn remove_entity(&mut self, id: &EntityId) -> Option<Entity> {
        let memberships = self.rooms.remove_entity_everywhere(id);
        let components = self.components.remove_all(id);
        let removed = self.entities.remove(id);
        if removed.is_some() {
            debug!("removed entity '{id}' ({memberships} memberships, {components} components)");
        }
        removed
    }

    pub fn get_entity(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Entities of the current room accepted by `filter`, in room order.
    pub fn get_entities(&self, filter: &EntityFilter) -> Vec<Entity> {
        let candidates = self
            .rooms
            .current()
            .map(|room| room.entities())
            .unwrap_or_default();
        self.entities.query(candidates, filter, &self.components)
    }

    /// [`get_entities`](Self::get_entities) with a JSON object filter.
    pub fn get_entities_from_json(&self, filter: &Value) -> EngineResult<Vec<Entity>> {
        Ok(self.get_entities(&EntityFilter::from_json(filter)?))
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Every entity record, in no particular order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Whether `entity` was created by this engine and still exists.
    pub fn owns(&self, entity: &Entity) -> bool {
        entity.owner() == self.id && self.entities.contains(entity.id())
    }

    fn require_entity(&self, id: &EntityId) -> EngineResult<()> {
        if self.entities.contains(id) {
            Ok(())
        } else {
            Err(EngineError::EntityNotFound(id.clone()))
        }
    }

    // ---------------------------------------------------------------------
    // Components
    // ---------------------------------------------------------------------

    pub fn set_component_for_entity(
        &mut self,
        name: &str,
        value: Value,
        entity_id: &EntityId,
    ) -> EngineResult<()> {
        self.require_entity(entity_id)?;
        self.components.set(name, value, entity_id);
        Ok(())
    }

    /// Replace the whole component set of an entity with `components`, which
    /// must be a JSON object.
    pub fn set_components_for_entity(&mut self, components: Value, entity_id: &EntityId) -> EngineResult<()> {
        self.require_entity(entity_id)?;
        let Value::Object(components) = components else {
            return Err(EngineError::invalid(format!(
                "components for entity '{entity_id}' are expected to be an object, received {components} instead"
            )));
        };
        self.components.remove_all(entity_id);
        for (name, value) in components {
            self.components.set(&name, value, entity_id);
        }
        Ok(())
    }

    /// Detach one component. Missing entities or components are ignored.
    pub fn remove_component_from_entity(&mut self, name: &str, entity_id: &EntityId) -> Option<Value> {
        self.components.remove(name, entity_id)
    }

    /// Detach every component of an entity. Returns how many were removed.
    pub fn remove_components_from_entity(&mut self, entity_id: &EntityId) -> usize {
        self.components.remove_all(entity_id)
    }

    pub fn get_component_for_entity(&self, name: &str, entity_id: &EntityId) -> EngineResult<Option<&Value>> {
        self.require_entity(entity_id)?;
        Ok(self.components.get(name, entity_id))
    }

    pub fn get_components_for_entity(&self, entity_id: &EntityId) -> EngineResult<Components> {
        self.require_entity(entity_id)?;
        Ok(self.components.components_for(entity_id))
    }

    pub fn has_component(&self, name: &str, entity_id: &EntityId) -> bool {
        self.components.has(name, entity_id)
    }

    /// Names of every component attached to at least one entity, sorted.
    pub fn component_names(&self) -> Vec<String> {
        self.components.names()
    }

    /// Store a typed value as a component, converting it through serde.
    pub fn set_component_as<T: Serialize>(
        &mut self,
        name: &str,
        value: &T,
        entity_id: &EntityId,
    ) -> EngineResult<()> {
        let value = serde_json::to_value(value).map_err(|err| {
            EngineError::invalid(format!("component '{name}' could not be converted: {err}"))
        })?;
        self.set_component_for_entity(name, value, entity_id)
    }

    /// Read a component as a typed value. `Ok(None)` when it is not set.
    pub fn get_component_as<T: DeserializeOwned>(
        &self,
        name: &str,
        entity_id: &EntityId,
    ) -> EngineResult<Option<T>> {
        let Some(value) = self.get_component_for_entity(name, entity_id)? else {
            return Ok(None);
        };
        T::deserialize(value).map(Some).map_err(|err| {
            EngineError::invalid(format!(
                "component '{name}' of entity '{entity_id}' has an unexpected shape: {err}"
            ))
        })
    }

    // ---------------------------------------------------------------------
    // Events
    // ---------------------------------------------------------------------

    pub fn add_event_handler<F>(&mut self, event: &str, handler: F)
    where
        F: Fn(&mut Engine, &[Value]) -> EngineResult<()> + 'static,
    {
        let handler: EventHandler = Rc::new(handler);
        self.events.add(event, handler);
        debug!("added handler #{} for '{event}'", self.events.handler_count(event));
    }

    /// Call `handler` once per entity matching `filter`, resolved at emit
    /// time.
    pub fn add_event_handler_for_entities<F>(&mut self, event: &str, handler: F, filter: EntityFilter)
    where
        F: Fn(&mut Engine, &Entity, &[Value]) -> EngineResult<()> + 'static,
    {
        self.add_event_handler(event, move |engine, args| {
            for entity in engine.get_entities(&filter) {
                handler(engine, &entity, args)?;
            }
            Ok(())
        });
    }

    /// Call `handler` once with every entity matching `filter`, resolved at
    /// emit time.
    pub fn add_event_handler_for_entity_group<F>(&mut self, event: &str, handler: F, filter: EntityFilter)
    where
        F: Fn(&mut Engine, &[Entity], &[Value]) -> EngineResult<()> + 'static,
    {
        self.add_event_handler(event, move |engine, args| {
            let entities = engine.get_entities(&filter);
            handler(engine, &entities, args)
        });
    }

    /// Invoke every handler of `event` in registration order. The first
    /// failing handler aborts the dispatch and its error is returned.
    pub fn emit_event(&mut self, event: &str, args: &[Value]) -> EngineResult<()> {
        let Some(handlers) = self.events.handlers_for(event) else {
            return Ok(());
        };
        trace!("emit '{event}' to {} handlers", handlers.len());
        for handler in handlers.iter() {
            handler(self, args)?;
        }
        Ok(())
    }

    pub fn handler_count(&self, event: &str) -> usize {
        self.events.handler_count(event)
    }

    pub fn has_handlers(&self, event: &str) -> bool {
        self.events.has_handlers(event)
    }

    // ---------------------------------------------------------------------
    // Modules & snapshots
    // ---------------------------------------------------------------------

    /// The module registered under `name`, if it has type `T`.
    pub fn module<T: 'static>(&self, name: &str) -> Option<Rc<std::cell::RefCell<T>>> {
        self.modules.get(name)
    }

    pub fn has_module(&self, name: &str) -> bool {
        self.modules.contains(name)
    }

    pub fn module_names(&self) -> &[String] {
        self.modules.names()
    }

    /// Capture the current store state. Later mutations do not affect it.
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot::new(
            self.components.clone(),
            self.entities.clone(),
            self.rooms.clone(),
            self.viewports.clone(),
        )
    }
}

fn into_components(value: Value) -> EngineResult<Components> {
    match value {
        Value::Object(components) => Ok(components),
        Value::Null => Ok(Components::new()),
        other => Err(EngineError::invalid(format!(
            "components are expected to be an object, received {other} instead"
        ))),
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("current_room", &self.rooms.current_id())
            .field("entities", &self.entities.len())
            .field("components", &self.components.names())
            .field("events", &self.events)
            .field("modules", &self.modules)
            .finish()
    }
}
