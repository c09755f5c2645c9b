//! Named-event handler registry.
//!
//! Handlers are stored per event name in registration order and are invoked
//! synchronously by [`Engine::emit_event`](crate::engine::Engine::emit_event),
//! each receiving the engine and the event arguments. They are never
//! reordered, deduplicated or run in parallel.
//!
//! Handler lists are copy-on-write: a dispatch iterates the list as it was
//! when the emit began, so handlers registered while an event is being
//! dispatched only run from the next emit of that event on.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::engine::Engine;
use crate::error::EngineResult;

/// A registered event handler.
pub type EventHandler = Rc<dyn Fn(&mut Engine, &[Value]) -> EngineResult<()>>;

type HandlerList = Rc<Vec<EventHandler>>;

#[derive(Clone, Default)]
pub struct EventBus {
    handlers: Rc<FxHashMap<String, HandlerList>>,
    generation: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `handler` to the list for `event`.
    pub fn add(&mut self, event: &str, handler: EventHandler) {
        let handlers = Rc::make_mut(&mut self.handlers);
        let list = handlers.entry(event.to_string()).or_default();
        Rc::make_mut(list).push(handler);
        self.generation += 1;
    }

    /// The handlers for `event` as they are right now.
    pub fn handlers_for(&self, event: &str) -> Option<HandlerList> {
        self.handlers.get(event).cloned()
    }

    pub fn handler_count(&self, event: &str) -> usize {
        self.handlers.get(event).map_or(0, |list| list.len())
    }

    pub fn has_handlers(&self, event: &str) -> bool {
        self.handler_count(event) > 0
    }

    /// Sorted names of every event with at least one handler.
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for name in self.event_names() {
            let count = self.handler_count(&name);
            map.entry(&name, &count);
        }
        map.finish()
    }
}
