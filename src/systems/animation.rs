//! Sprite animation.
//!
//! [`update_animated_sprites`] advances every animating
//! [`SpriteComponent`] in the current room against the frame clock. Frames
//! are derived from the time since the animation started rather than
//! accumulated per frame, so a slow frame never desynchronises playback.

use log::trace;

use crate::components::sprite::{SPRITE, SpriteComponent};
use crate::engine::Engine;
use crate::error::EngineResult;
use crate::resources::filter::EntityFilter;
use crate::resources::spritestore::SpriteStore;

/// Frame to show `elapsed_ms` after the animation started.
///
/// Looping animations wrap around; others hold the last frame. Sprites
/// without frames and non-positive rates always show frame 0.
pub fn calculate_new_frame_index(
    frame_count: usize,
    frames_per_second: f32,
    elapsed_ms: f64,
    is_looping: bool,
) -> usize {
    if frame_count == 0 || frames_per_second <= 0.0 || elapsed_ms <= 0.0 {
        return 0;
    }
    let frames_passed = (elapsed_ms * f64::from(frames_per_second) / 1_000.0).floor() as usize;
    if is_looping {
        frames_passed % frame_count
    } else {
        frames_passed.min(frame_count - 1)
    }
}

/// Advance the sprite components of the current room to `now_ms`.
///
/// A component seen for the first time gets its start time stamped; the
/// start time is shifted back by its current frame so playback resumes from
/// there. A non-looping animation stops animating on its last frame.
/// Components naming an unknown sprite are left alone, and a component is only
/// written back when its playback state changed. Returns how many were.
pub fn update_animated_sprites(engine: &mut Engine, sprites: &SpriteStore, now_ms: f64) -> EngineResult<usize> {
    let mut advanced = 0;
    for entity in engine.get_entities(&EntityFilter::new().require(SPRITE)) {
        let Some(previous) = engine.get_component_as::<SpriteComponent>(SPRITE, entity.id())? else {
            continue;
        };
        if !previous.is_animating {
            continue;
        }
        let mut sprite = previous.clone();
        let Ok(definition) = sprites.get_sprite(&sprite.name) else {
            trace!("entity '{}' animates unknown sprite '{}'", entity.id(), sprite.name);
            continue;
        };
        let frame_count = definition.frames.len();

        let start = match sprite.animation_start_time {
            Some(start) => start,
            None => {
                let offset = if sprite.frames_per_second > 0.0 {
                    sprite.current_frame_index as f64 * 1_000.0 / f64::from(sprite.frames_per_second)
                } else {
                    0.0
                };
                let start = now_ms - offset;
                sprite.animation_start_time = Some(start);
                start
            }
        };

        sprite.current_frame_index = calculate_new_frame_index(
            frame_count,
            sprite.frames_per_second,
            now_ms - start,
            sprite.is_looping,
        );
        if !sprite.is_looping && sprite.current_frame_index + 1 >= frame_count {
            sprite.is_animating = false;
        }

        if sprite == previous {
            continue;
        }
        engine.set_component_as(SPRITE, &sprite, entity.id())?;
        advanced += 1;
    }
    Ok(advanced)
}
