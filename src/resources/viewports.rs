//! Viewports: camera-like records describing a rendered sub-region.
//!
//! A viewport shows the part of its room that starts at `origin` (room
//! coordinates) and spans `size`, painted at `position` on the surface.
//! Viewports are keyed independently of rooms; which room a viewport belongs
//! to is recorded in that room's viewport list.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::components::geometry::{Size, Vec2};
use crate::error::{EngineError, EngineResult};
use crate::resources::identifiers::{EntityId, ViewportId};

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub id: ViewportId,
    /// Where the viewport is painted on the surface.
    pub position: Vec2,
    /// Top-left corner of the visible region, in room coordinates.
    pub origin: Vec2,
    pub size: Size,
    pub is_active: bool,
    /// Entity the camera keeps centred, if any.
    pub entity_to_follow: Option<EntityId>,
}

/// Caller-supplied overrides merged over the viewport defaults.
///
/// Defaults: generated id, position and origin at `(0, 0)`, zero size,
/// active, following nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewportProperties {
    pub id: Option<ViewportId>,
    pub position: Option<Vec2>,
    pub origin: Option<Vec2>,
    pub size: Option<Size>,
    pub is_active: Option<bool>,
    pub entity_to_follow: Option<EntityId>,
}

impl ViewportProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<ViewportId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn at(mut self, position: Vec2) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    pub fn following(mut self, entity: impl Into<EntityId>) -> Self {
        self.entity_to_follow = Some(entity.into());
        self
    }

    pub(crate) fn into_viewport(self, generated: impl FnOnce() -> ViewportId) -> Viewport {
        Viewport {
            id: self.id.unwrap_or_else(generated),
            position: self.position.unwrap_or(Vec2::ZERO),
            origin: self.origin.unwrap_or(Vec2::ZERO),
            size: self.size.unwrap_or(Size::ZERO),
            is_active: self.is_active.unwrap_or(true),
            entity_to_follow: self.entity_to_follow,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ViewportRegistry {
    viewports: Rc<FxHashMap<ViewportId, Viewport>>,
    generation: u64,
}

impl ViewportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, viewport: Viewport) {
        Rc::make_mut(&mut self.viewports).insert(viewport.id.clone(), viewport);
        self.generation += 1;
    }

    pub fn get(&self, id: &ViewportId) -> Option<&Viewport> {
        self.viewports.get(id)
    }

    pub fn contains(&self, id: &ViewportId) -> bool {
        self.viewports.contains_key(id)
    }

    /// Apply `change` to a stored viewport. The id cannot be changed.
    pub fn update(&mut self, id: &ViewportId, change: impl FnOnce(&mut Viewport)) -> EngineResult<()> {
        if !self.viewports.contains_key(id) {
            return Err(EngineError::ViewportNotFound(id.clone()));
        }
        let viewport = Rc::make_mut(&mut self.viewports)
            .get_mut(id)
            .ok_or_else(|| EngineError::ViewportNotFound(id.clone()))?;
        change(viewport);
        viewport.id = id.clone();
        self.generation += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.viewports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.viewports.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Viewport> {
        self.viewports.values()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn same_state(&self, other: &ViewportRegistry) -> bool {
        Rc::ptr_eq(&self.viewports, &other.viewports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_nothing_is_given() {
        let viewport = ViewportProperties::new().into_viewport(|| ViewportId::from("generated"));
        assert_eq!(viewport.id.as_str(), "generated");
        assert_eq!(viewport.position, Vec2::ZERO);
        assert_eq!(viewport.origin, Vec2::ZERO);
        assert_eq!(viewport.size, Size::ZERO);
        assert!(viewport.is_active);
        assert_eq!(viewport.entity_to_follow, None);
    }

    #[test]
    fn properties_override_defaults() {
        let viewport = ViewportProperties::new()
            .with_id("main")
            .at(Vec2::new(10.0, 20.0))
            .with_size(Size::new(160.0, 90.0))
            .active(false)
            .following("hero")
            .into_viewport(|| ViewportId::from("unused"));
        assert_eq!(viewport.id.as_str(), "main");
        assert_eq!(viewport.position, Vec2::new(10.0, 20.0));
        assert_eq!(viewport.size, Size::new(160.0, 90.0));
        assert!(!viewport.is_active);
        assert_eq!(viewport.entity_to_follow, Some(EntityId::from("hero")));
    }

    #[test]
    fn update_keeps_id_and_fails_on_unknown() {
        let mut registry = ViewportRegistry::new();
        registry.insert(ViewportProperties::new().into_viewport(|| ViewportId::from("v")));

        registry
            .update(&ViewportId::from("v"), |vp| {
                vp.origin = Vec2::new(5.0, 5.0);
                vp.id = ViewportId::from("renamed");
            })
            .unwrap();
        let viewport = registry.get(&ViewportId::from("v")).unwrap();
        assert_eq!(viewport.origin, Vec2::new(5.0, 5.0));
        assert_eq!(viewport.id.as_str(), "v");

        assert_eq!(
            registry.update(&ViewportId::from("x"), |_| {}),
            Err(EngineError::ViewportNotFound(ViewportId::from("x")))
        );
    }
}
