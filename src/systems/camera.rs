//! Camera follow.
//!
//! Viewports that name an `entity_to_follow` are re-centred on that entity's
//! `position` once per frame, clamped so they never show space outside the
//! room. Hosts opt in with [`install`].

use log::trace;

use crate::components::geometry::{POSITION, Size, Vec2};
use crate::engine::Engine;
use crate::error::EngineResult;
use crate::events::phase;

/// Register [`follow_entities`] on `endUpdate`.
pub fn install(engine: &mut Engine) {
    engine.add_event_handler(phase::END_UPDATE, |engine, _| {
        follow_entities(engine)?;
        Ok(())
    });
}

/// Centre each active viewport of the current room on its followed entity.
/// Returns how many viewports moved.
pub fn follow_entities(engine: &mut Engine) -> EngineResult<usize> {
    let Some(room_size) = engine.current_room().map(|room| room.size()) else {
        return Ok(0);
    };

    let mut moved = 0;
    for viewport in engine.viewports_in_current_room() {
        if !viewport.is_active {
            continue;
        }
        let Some(target) = viewport.entity_to_follow.as_ref() else {
            continue;
        };
        if engine.get_entity(target).is_none() {
            trace!("viewport '{}' follows missing entity '{target}'", viewport.id);
            continue;
        }
        let Some(position) = engine.get_component_as::<Vec2>(POSITION, target)? else {
            continue;
        };

        let origin = clamp_origin(position - viewport.size.half(), viewport.size, room_size);
        if origin != viewport.origin {
            engine.update_viewport(&viewport.id, |vp| vp.origin = origin)?;
            moved += 1;
        }
    }
    Ok(moved)
}

fn clamp_origin(origin: Vec2, view: Size, room: Size) -> Vec2 {
    let max_x = (room.width - view.width).max(0.0);
    let max_y = (room.height - view.height).max(0.0);
    Vec2::new(origin.x.clamp(0.0, max_x), origin.y.clamp(0.0, max_y))
}
