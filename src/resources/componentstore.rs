//! Component storage: component name -> (entity id -> value).
//!
//! The store is versioned copy-on-write. Both the outer map and each
//! per-component map sit behind an `Rc` and are mutated through
//! `Rc::make_mut`, so a clone of the store (a snapshot) keeps seeing the
//! state it was taken from while the live store moves on. Only the maps that
//! are actually touched get copied, and only while a snapshot shares them.
//!
//! A component name with no attached entities is never kept: removing the
//! last association deletes the whole per-component map.
//!
//! The store itself does not know which entities exist; the
//! [`Engine`](crate::engine::Engine) checks entity existence before it
//! forwards get/set calls here.

use std::rc::Rc;

use log::debug;
use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::components::value::Components;
use crate::resources::identifiers::EntityId;

/// Values of one component name, keyed by entity.
pub type ComponentMap = FxHashMap<EntityId, Value>;

#[derive(Debug, Clone, Default)]
pub struct ComponentStore {
    components: Rc<FxHashMap<String, Rc<ComponentMap>>>,
    generation: u64,
}

impl ComponentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace the `(name, entity)` association.
    pub fn set(&mut self, name: &str, value: Value, entity: &EntityId) {
        let components = Rc::make_mut(&mut self.components);
        let map = components.entry(name.to_string()).or_default();
        Rc::make_mut(map).insert(entity.clone(), value);
        self.generation += 1;
    }

    /// Delete the `(name, entity)` association, pruning the component map when
    /// it becomes empty. Absent associations are left alone.
    pub fn remove(&mut self, name: &str, entity: &EntityId) -> Option<Value> {
        if !self.has(name, entity) {
            return None;
        }

        let components = Rc::make_mut(&mut self.components);
        let map = components.get_mut(name)?;
        let removed = Rc::make_mut(map).remove(entity);
        let now_empty = map.is_empty();
        if now_empty {
            components.remove(name);
            debug!("pruned empty component map '{name}'");
        }
        self.generation += 1;
        removed
    }

    /// Remove every association held by `entity`. Returns how many were removed.
    pub fn remove_all(&mut self, entity: &EntityId) -> usize {
        let names: Vec<String> = self
            .components
            .iter()
            .filter(|(_, map)| map.contains_key(entity))
            .map(|(name, _)| name.clone())
            .collect();
        for name in &names {
            self.remove(name, entity);
        }
        names.len()
    }

    pub fn get(&self, name: &str, entity: &EntityId) -> Option<&Value> {
        self.components.get(name)?.get(entity)
    }

    pub fn has(&self, name: &str, entity: &EntityId) -> bool {
        self.components
            .get(name)
            .is_some_and(|map| map.contains_key(entity))
    }

    /// Whether any entity currently holds a component called `name`.
    pub fn contains_name(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    /// All values of one component name.
    pub fn values_of(&self, name: &str) -> Option<&ComponentMap> {
        self.components.get(name).map(|map| map.as_ref())
    }

    /// Every component attached to `entity`, keyed by component name.
    pub fn components_for(&self, entity: &EntityId) -> Components {
        let mut components = Components::new();
        for (name, map) in self.components.iter() {
            if let Some(value) = map.get(entity) {
                components.insert(name.clone(), value.clone());
            }
        }
        components
    }

    /// Sorted listing of the component names currently in use.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.components.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Bumped on every effective mutation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether two stores share the same top-level mapping.
    pub fn same_state(&self, other: &ComponentStore) -> bool {
        Rc::ptr_eq(&self.components, &other.components)
    }
}
